//! Feature Record - one telemetry snapshot in model layout
//!
//! Field order here mirrors `FEATURE_LAYOUT`; [`FeatureRecord::to_vector`] is
//! the only place that turns named fields into model input.

use serde::{Deserialize, Serialize};
use super::layout::FEATURE_COUNT;

/// Identifier of a tracked ATM, e.g. `"ATM-001"`
pub type EntityId = String;

/// Fixed-shape numeric feature record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub atm_age_years: f64,
    pub hour_of_day: f64,
    pub day_of_week: f64,
    pub is_weekend: f64,

    pub cash_level_pct: f64,
    pub network_latency_ms: f64,
    pub avg_response_time_ms: f64,
    pub temp_celsius: f64,
    pub voltage_fluctuations_24h: f64,
    pub ups_battery_level_pct: f64,
    pub tx_volume_1h: f64,
    pub error_count_1h: f64,

    pub network_latency_ms_roll6h_mean: f64,
    pub network_latency_ms_roll6h_std: f64,
    pub avg_response_time_ms_roll6h_mean: f64,
    pub avg_response_time_ms_roll6h_std: f64,
    pub temp_celsius_roll6h_mean: f64,
    pub temp_celsius_roll6h_std: f64,
    pub voltage_fluctuations_24h_roll6h_mean: f64,
    pub voltage_fluctuations_24h_roll6h_std: f64,
    pub error_count_1h_roll6h_mean: f64,
    pub error_count_1h_roll6h_std: f64,
}

impl FeatureRecord {
    /// Values in `FEATURE_LAYOUT` order
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.atm_age_years,
            self.hour_of_day,
            self.day_of_week,
            self.is_weekend,
            self.cash_level_pct,
            self.network_latency_ms,
            self.avg_response_time_ms,
            self.temp_celsius,
            self.voltage_fluctuations_24h,
            self.ups_battery_level_pct,
            self.tx_volume_1h,
            self.error_count_1h,
            self.network_latency_ms_roll6h_mean,
            self.network_latency_ms_roll6h_std,
            self.avg_response_time_ms_roll6h_mean,
            self.avg_response_time_ms_roll6h_std,
            self.temp_celsius_roll6h_mean,
            self.temp_celsius_roll6h_std,
            self.voltage_fluctuations_24h_roll6h_mean,
            self.voltage_fluctuations_24h_roll6h_std,
            self.error_count_1h_roll6h_mean,
            self.error_count_1h_roll6h_std,
        ]
    }

    /// Get feature by layout name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.to_vector()[i])
    }
}

/// Feature record tagged with the entity it describes.
///
/// Serializes flat: `{"atm_id": "ATM-001", "atm_age_years": 5.0, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedFeatures {
    pub atm_id: EntityId,
    #[serde(flatten)]
    pub features: FeatureRecord,
}

impl TaggedFeatures {
    pub fn new(atm_id: impl Into<EntityId>, features: FeatureRecord) -> Self {
        Self { atm_id: atm_id.into(), features }
    }
}
