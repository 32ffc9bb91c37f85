//! Logic Module - ATM health pipeline
//!
//! - `features/` - feature layout, records and synthesis
//! - `model/` - classifier adapter (forest / ONNX artifacts, thresholds)
//! - `status/` - health tiers, status classifier, result store
//! - `pipeline` - producer cycle (synthesize, classify, publish)
//! - `dashboard/` - polling consumer and text rendering
//! - `remote/` - predict/status service client and wire types

pub mod config;
pub mod dashboard;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod remote;
pub mod scheduler;
pub mod status;
