//! Feature Synthesizer - synthetic ATM telemetry
//!
//! Two modes:
//! - **Profile**: each configured ATM has a severity level (0 = healthy,
//!   2 = warning, 4 = critical, or a set to sample from). Every signal is
//!   `base + severity * multiplier`, so degradation grows monotonically with
//!   severity. ATMs without a profile fall back to random sampling.
//! - **Random**: every signal is drawn independently and uniformly from
//!   [`RANDOM_RANGES`].
//!
//! Calendar fields always come from the supplied wall-clock time.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::record::FeatureRecord;

/// Highest severity level a profile may use
pub const MAX_SEVERITY: u8 = 4;

// ============================================================================
// CONFIG TYPES
// ============================================================================

/// How feature records are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Severity profiles, random sampling for unprofiled ATMs
    #[default]
    Profile,
    /// Uniform random sampling for every ATM
    Random,
}

impl std::str::FromStr for SynthesisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown synthesis mode '{}'", other)),
        }
    }
}

/// Severity of one ATM: a fixed level, or levels sampled uniformly each cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeverityProfile {
    Fixed(u8),
    Fluctuating(Vec<u8>),
}

impl SeverityProfile {
    pub fn levels(&self) -> &[u8] {
        match self {
            SeverityProfile::Fixed(level) => std::slice::from_ref(level),
            SeverityProfile::Fluctuating(levels) => levels,
        }
    }

    fn pick<R: Rng>(&self, rng: &mut R) -> Option<u8> {
        match self {
            SeverityProfile::Fixed(level) => Some(*level),
            SeverityProfile::Fluctuating(levels) => levels.choose(rng).copied(),
        }
    }
}

// ============================================================================
// PROFILE MODE
// ============================================================================

/// `(base, multiplier)` per signal
struct Linear(f64, f64);

impl Linear {
    fn at(&self, severity: f64) -> f64 {
        self.0 + severity * self.1
    }
}

const ATM_AGE_YEARS: f64 = 5.0;

const CASH_LEVEL: Linear = Linear(90.0, -12.0);
const NETWORK_LATENCY: Linear = Linear(40.0, 180.0);
const RESPONSE_TIME: Linear = Linear(120.0, 350.0);
const TEMPERATURE: Linear = Linear(32.0, 8.0);
const VOLTAGE_FLUCTUATIONS: Linear = Linear(1.0, 8.0);
const BATTERY_LEVEL: Linear = Linear(95.0, -15.0);
const TX_VOLUME: Linear = Linear(20.0, 6.0);
const ERROR_COUNT: Linear = Linear(0.0, 5.0);

const LATENCY_MEAN: Linear = Linear(45.0, 170.0);
const LATENCY_STD: Linear = Linear(5.0, 20.0);
const RESPONSE_MEAN: Linear = Linear(150.0, 320.0);
const RESPONSE_STD: Linear = Linear(10.0, 40.0);
const TEMPERATURE_MEAN: Linear = Linear(33.0, 7.0);
const TEMPERATURE_STD: Linear = Linear(1.0, 4.0);
const VOLTAGE_MEAN: Linear = Linear(2.0, 7.0);
const VOLTAGE_STD: Linear = Linear(1.0, 4.0);
const ERROR_MEAN: Linear = Linear(0.5, 3.0);
const ERROR_STD: Linear = Linear(0.1, 2.0);

/// Hour, weekday (Monday = 0) and weekend flag
fn calendar(now: NaiveDateTime) -> (f64, f64, f64) {
    let weekday = now.weekday();
    let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
    (
        now.hour() as f64,
        weekday.num_days_from_monday() as f64,
        if weekend { 1.0 } else { 0.0 },
    )
}

/// Deterministic record for a severity level
pub fn profile_features(severity: u8, now: NaiveDateTime) -> FeatureRecord {
    let s = severity as f64;
    let (hour_of_day, day_of_week, is_weekend) = calendar(now);

    FeatureRecord {
        atm_age_years: ATM_AGE_YEARS,
        hour_of_day,
        day_of_week,
        is_weekend,

        cash_level_pct: CASH_LEVEL.at(s),
        network_latency_ms: NETWORK_LATENCY.at(s),
        avg_response_time_ms: RESPONSE_TIME.at(s),
        temp_celsius: TEMPERATURE.at(s),
        voltage_fluctuations_24h: VOLTAGE_FLUCTUATIONS.at(s),
        ups_battery_level_pct: BATTERY_LEVEL.at(s),
        tx_volume_1h: TX_VOLUME.at(s),
        error_count_1h: ERROR_COUNT.at(s),

        network_latency_ms_roll6h_mean: LATENCY_MEAN.at(s),
        network_latency_ms_roll6h_std: LATENCY_STD.at(s),
        avg_response_time_ms_roll6h_mean: RESPONSE_MEAN.at(s),
        avg_response_time_ms_roll6h_std: RESPONSE_STD.at(s),
        temp_celsius_roll6h_mean: TEMPERATURE_MEAN.at(s),
        temp_celsius_roll6h_std: TEMPERATURE_STD.at(s),
        voltage_fluctuations_24h_roll6h_mean: VOLTAGE_MEAN.at(s),
        voltage_fluctuations_24h_roll6h_std: VOLTAGE_STD.at(s),
        error_count_1h_roll6h_mean: ERROR_MEAN.at(s),
        error_count_1h_roll6h_std: ERROR_STD.at(s),
    }
}

// ============================================================================
// RANDOM MODE
// ============================================================================

/// Inclusive sampling range per non-calendar field
pub const RANDOM_RANGES: &[(&str, f64, f64)] = &[
    ("atm_age_years", 2.0, 8.0),
    ("cash_level_pct", 30.0, 100.0),
    ("network_latency_ms", 50.0, 300.0),
    ("avg_response_time_ms", 100.0, 600.0),
    ("temp_celsius", 25.0, 45.0),
    ("voltage_fluctuations_24h", 0.0, 5.0),
    ("ups_battery_level_pct", 40.0, 100.0),
    ("tx_volume_1h", 10.0, 200.0),
    ("error_count_1h", 0.0, 5.0),
    ("network_latency_ms_roll6h_mean", 50.0, 300.0),
    ("network_latency_ms_roll6h_std", 1.0, 30.0),
    ("avg_response_time_ms_roll6h_mean", 100.0, 600.0),
    ("avg_response_time_ms_roll6h_std", 5.0, 50.0),
    ("temp_celsius_roll6h_mean", 25.0, 45.0),
    ("temp_celsius_roll6h_std", 1.0, 5.0),
    ("voltage_fluctuations_24h_roll6h_mean", 0.0, 5.0),
    ("voltage_fluctuations_24h_roll6h_std", 0.0, 2.0),
    ("error_count_1h_roll6h_mean", 0.0, 5.0),
    ("error_count_1h_roll6h_std", 0.0, 2.0),
];

/// Independently sampled record
pub fn random_features<R: Rng>(rng: &mut R, now: NaiveDateTime) -> FeatureRecord {
    let (hour_of_day, day_of_week, is_weekend) = calendar(now);
    let mut sample = |name: &str| -> f64 {
        let (low, high) = RANDOM_RANGES.iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, low, high)| (*low, *high))
            .unwrap_or((0.0, 0.0));
        rng.gen_range(low..=high)
    };

    FeatureRecord {
        atm_age_years: sample("atm_age_years"),
        hour_of_day,
        day_of_week,
        is_weekend,

        cash_level_pct: sample("cash_level_pct"),
        network_latency_ms: sample("network_latency_ms"),
        avg_response_time_ms: sample("avg_response_time_ms"),
        temp_celsius: sample("temp_celsius"),
        voltage_fluctuations_24h: sample("voltage_fluctuations_24h"),
        ups_battery_level_pct: sample("ups_battery_level_pct"),
        tx_volume_1h: sample("tx_volume_1h"),
        error_count_1h: sample("error_count_1h"),

        network_latency_ms_roll6h_mean: sample("network_latency_ms_roll6h_mean"),
        network_latency_ms_roll6h_std: sample("network_latency_ms_roll6h_std"),
        avg_response_time_ms_roll6h_mean: sample("avg_response_time_ms_roll6h_mean"),
        avg_response_time_ms_roll6h_std: sample("avg_response_time_ms_roll6h_std"),
        temp_celsius_roll6h_mean: sample("temp_celsius_roll6h_mean"),
        temp_celsius_roll6h_std: sample("temp_celsius_roll6h_std"),
        voltage_fluctuations_24h_roll6h_mean: sample("voltage_fluctuations_24h_roll6h_mean"),
        voltage_fluctuations_24h_roll6h_std: sample("voltage_fluctuations_24h_roll6h_std"),
        error_count_1h_roll6h_mean: sample("error_count_1h_roll6h_mean"),
        error_count_1h_roll6h_std: sample("error_count_1h_roll6h_std"),
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

pub struct FeatureSynthesizer<R = StdRng> {
    mode: SynthesisMode,
    profiles: HashMap<String, SeverityProfile>,
    rng: R,
}

impl FeatureSynthesizer<StdRng> {
    pub fn new(mode: SynthesisMode, profiles: HashMap<String, SeverityProfile>) -> Self {
        Self::with_rng(mode, profiles, StdRng::from_entropy())
    }
}

impl<R: Rng> FeatureSynthesizer<R> {
    pub fn with_rng(mode: SynthesisMode, profiles: HashMap<String, SeverityProfile>, rng: R) -> Self {
        Self { mode, profiles, rng }
    }

    pub fn mode(&self) -> SynthesisMode {
        self.mode
    }

    /// Severity used for this cycle, `None` when the ATM is sampled randomly
    pub fn severity_for(&mut self, atm_id: &str) -> Option<u8> {
        match self.mode {
            SynthesisMode::Random => None,
            SynthesisMode::Profile => self.profiles.get(atm_id).and_then(|p| p.pick(&mut self.rng)),
        }
    }

    pub fn synthesize(&mut self, atm_id: &str, now: NaiveDateTime) -> FeatureRecord {
        match self.severity_for(atm_id) {
            Some(severity) => profile_features(severity, now),
            None => random_features(&mut self.rng, now),
        }
    }
}
