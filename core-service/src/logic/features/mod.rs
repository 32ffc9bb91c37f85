//! Features Module - feature schema and synthetic telemetry
//!
//! The layout is fixed by what the classifier was fitted on; the
//! synthesizer only ever produces records in that layout.

pub mod layout;
pub mod record;
pub mod synth;


// Re-export common types
pub use layout::{
    feature_index, layout_hash, validate_feature_names, validate_record_fields,
    LayoutMismatchError, ENTITY_FIELD, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use record::{EntityId, FeatureRecord, TaggedFeatures};
pub use synth::{FeatureSynthesizer, SeverityProfile, SynthesisMode, MAX_SEVERITY};
