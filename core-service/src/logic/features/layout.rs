//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the classifier is fitted on.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! A classifier artifact declares the feature names it was fitted on. Loading
//! fails unless that list equals [`FEATURE_LAYOUT`] exactly, name for name and
//! in the same order.

use std::collections::BTreeSet;

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Name of the entity tag carried next to the features on the wire
pub const ENTITY_FIELD: &str = "atm_id";

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the model input
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Static / calendar (0-3) ===
    "atm_age_years",                        // 0
    "hour_of_day",                          // 1: wall clock
    "day_of_week",                          // 2: Monday = 0
    "is_weekend",                           // 3: 1 on Sat/Sun

    // === Raw signals (4-11) ===
    "cash_level_pct",                       // 4
    "network_latency_ms",                   // 5
    "avg_response_time_ms",                 // 6
    "temp_celsius",                         // 7
    "voltage_fluctuations_24h",             // 8
    "ups_battery_level_pct",                // 9
    "tx_volume_1h",                         // 10
    "error_count_1h",                       // 11

    // === 6h rolling statistics (12-21) ===
    "network_latency_ms_roll6h_mean",       // 12
    "network_latency_ms_roll6h_std",        // 13
    "avg_response_time_ms_roll6h_mean",     // 14
    "avg_response_time_ms_roll6h_std",      // 15
    "temp_celsius_roll6h_mean",             // 16
    "temp_celsius_roll6h_std",              // 17
    "voltage_fluctuations_24h_roll6h_mean", // 18
    "voltage_fluctuations_24h_roll6h_std",  // 19
    "error_count_1h_roll6h_mean",           // 20
    "error_count_1h_roll6h_std",            // 21
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 22;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered feature names
pub fn compute_layout_hash(names: &[&str]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the current layout
pub fn layout_hash() -> u32 {
    compute_layout_hash(FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Difference between a declared field set and the current layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
    pub order_differs: bool,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: missing [{}], unexpected [{}]",
            self.missing.join(", "),
            self.unexpected.join(", ")
        )?;
        if self.order_differs {
            write!(f, ", order differs from v{} layout", FEATURE_VERSION)?;
        }
        Ok(())
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate an ordered list of feature names (as declared by a model artifact)
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    let matches = names.len() == FEATURE_COUNT
        && names.iter().zip(FEATURE_LAYOUT).all(|(a, b)| a.as_ref() == *b);
    if matches {
        return Ok(());
    }

    let (missing, unexpected) = diff_fields(names.iter().map(|n| n.as_ref()));
    Err(LayoutMismatchError {
        order_differs: missing.is_empty() && unexpected.is_empty(),
        missing,
        unexpected,
    })
}

/// Validate the key set of a wire record (order-insensitive).
///
/// The entity tag field is allowed alongside the features.
pub fn validate_record_fields<'a, I>(keys: I) -> Result<(), LayoutMismatchError>
where
    I: IntoIterator<Item = &'a str>,
{
    let (missing, unexpected) = diff_fields(keys.into_iter().filter(|k| *k != ENTITY_FIELD));
    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(LayoutMismatchError { missing, unexpected, order_differs: false })
    }
}

fn diff_fields<'a, I>(keys: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let present: BTreeSet<&str> = keys.into_iter().collect();

    let missing = FEATURE_LAYOUT.iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();
    let unexpected = present.iter()
        .filter(|name| feature_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    (missing, unexpected)
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let mut reordered: Vec<&str> = FEATURE_LAYOUT.to_vec();
        reordered.swap(0, 1);
        assert_ne!(compute_layout_hash(&reordered), layout_hash());
    }

    #[test]
    fn test_validate_feature_names_exact() {
        assert!(validate_feature_names(FEATURE_LAYOUT).is_ok());
    }

    #[test]
    fn test_validate_feature_names_reordered() {
        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(4, 5);
        let err = validate_feature_names(&names).unwrap_err();
        assert!(err.order_differs);
        assert!(err.missing.is_empty());
    }

    #[test]
    fn test_validate_feature_names_missing_and_extra() {
        let mut names: Vec<&str> = FEATURE_LAYOUT[1..].to_vec();
        names.push("fan_speed_rpm");
        let err = validate_feature_names(&names).unwrap_err();
        assert_eq!(err.missing, vec!["atm_age_years".to_string()]);
        assert_eq!(err.unexpected, vec!["fan_speed_rpm".to_string()]);
        assert!(err.to_string().contains("fan_speed_rpm"));
    }

    #[test]
    fn test_validate_record_fields_allows_entity_tag() {
        let mut keys: Vec<&str> = FEATURE_LAYOUT.to_vec();
        keys.push(ENTITY_FIELD);
        keys.reverse();
        assert!(validate_record_fields(keys).is_ok());
    }

    #[test]
    fn test_validate_record_fields_reports_missing() {
        let keys = FEATURE_LAYOUT.iter().copied().filter(|k| *k != "temp_celsius");
        let err = validate_record_fields(keys).unwrap_err();
        assert_eq!(err.missing, vec!["temp_celsius".to_string()]);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("atm_age_years"), Some(0));
        assert_eq!(feature_index("error_count_1h"), Some(11));
        assert_eq!(feature_index("error_count_1h_roll6h_std"), Some(21));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(100), None);
    }
}
