//! Fleet Configuration
//!
//! Tracked ATMs, their severity profiles, status overrides and map
//! locations, plus the status thresholds. Loaded from a JSON file; the
//! reference fleet in `config/fleet.json` is compiled in as the fallback.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::features::{FeatureSynthesizer, SeverityProfile, SynthesisMode, MAX_SEVERITY};
use crate::logic::model::{StatusThresholds, ThresholdError};
use crate::logic::status::{StatusClassifier, StatusOverride};

const REFERENCE_FLEET: &str = include_str!("../../config/fleet.json");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read fleet config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fleet config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fleet config: {0}")]
    Invalid(String),

    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdError),
}

/// Map position of an ATM (rendering only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One tracked ATM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub atm_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityProfile>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub status_override: Option<StatusOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub synthesis_mode: SynthesisMode,
    pub thresholds: StatusThresholds,
    pub entities: Vec<EntityConfig>,
}

impl FleetConfig {
    /// Bundled reference deployment (ATM-001..004)
    pub fn reference() -> Self {
        // Covered by test_reference_fleet_is_valid
        Self::from_json(REFERENCE_FLEET).expect("bundled fleet config is valid")
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FleetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Fleet config loaded from {} ({} ATMs)", path.display(), config.entities.len());
        Ok(config)
    }

    /// `FLEET_CONFIG` file (or the reference fleet), then `SYNTHESIS_MODE`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match constants::get_fleet_config_path() {
            Some(path) => Self::load(path)?,
            None => {
                log::info!("FLEET_CONFIG not set, using reference fleet");
                Self::reference()
            }
        };

        config.apply_mode_override(constants::get_synthesis_mode())?;

        log::info!(
            "Status thresholds: WARNING > {}, CRITICAL > {} (synthesis: {:?})",
            config.thresholds.warning_above,
            config.thresholds.critical_above,
            config.synthesis_mode
        );

        Ok(config)
    }

    /// Replace the file's synthesis mode (`SYNTHESIS_MODE`)
    pub fn apply_mode_override(&mut self, mode: Option<String>) -> Result<(), ConfigError> {
        if let Some(mode) = mode {
            self.synthesis_mode = mode.parse::<SynthesisMode>().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;

        if self.entities.is_empty() {
            return Err(ConfigError::Invalid("no entities configured".to_string()));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if entity.atm_id.trim().is_empty() {
                return Err(ConfigError::Invalid("empty atm_id".to_string()));
            }
            if !seen.insert(entity.atm_id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate atm_id {}", entity.atm_id)));
            }
            if let Some(profile) = &entity.severity {
                if profile.levels().is_empty() {
                    return Err(ConfigError::Invalid(format!("{}: empty severity list", entity.atm_id)));
                }
                if let Some(level) = profile.levels().iter().find(|l| **l > MAX_SEVERITY) {
                    return Err(ConfigError::Invalid(format!(
                        "{}: severity {} exceeds {}",
                        entity.atm_id, level, MAX_SEVERITY
                    )));
                }
            }
        }
        Ok(())
    }

    /// Tracked ids in configured order
    pub fn tracked_ids(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.atm_id.clone()).collect()
    }

    pub fn location(&self, atm_id: &str) -> Option<&Location> {
        self.entities.iter()
            .find(|e| e.atm_id == atm_id)
            .and_then(|e| e.location.as_ref())
    }

    pub fn profiles(&self) -> HashMap<String, SeverityProfile> {
        self.entities.iter()
            .filter_map(|e| e.severity.clone().map(|p| (e.atm_id.clone(), p)))
            .collect()
    }

    pub fn status_classifier(&self) -> StatusClassifier {
        StatusClassifier::new(self.thresholds).with_overrides(
            self.entities.iter()
                .filter_map(|e| e.status_override.clone().map(|o| (e.atm_id.clone(), o))),
        )
    }

    pub fn synthesizer(&self) -> FeatureSynthesizer {
        FeatureSynthesizer::new(self.synthesis_mode, self.profiles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::status::HealthTier;
    use std::io::Write;

    #[test]
    fn test_reference_fleet_is_valid() {
        let fleet = FleetConfig::reference();
        assert_eq!(fleet.tracked_ids(), ["ATM-001", "ATM-002", "ATM-003", "ATM-004"]);
        assert_eq!(fleet.synthesis_mode, SynthesisMode::Profile);
        assert_eq!(fleet.thresholds.warning_above, 0.2);
        assert_eq!(fleet.thresholds.critical_above, 0.8);

        let profiles = fleet.profiles();
        assert_eq!(profiles["ATM-003"], SeverityProfile::Fixed(4));
        assert_eq!(profiles["ATM-004"], SeverityProfile::Fluctuating(vec![0, 1, 2]));

        let classifier = fleet.status_classifier();
        assert_eq!(classifier.override_for("ATM-003").map(|o| o.tier), Some(HealthTier::Critical));
        assert!(classifier.override_for("ATM-004").is_none());

        assert_eq!(fleet.location("ATM-002").map(|l| l.lat), Some(13.0604));
    }

    #[test]
    fn test_thresholds_are_required() {
        let json = r#"{ "entities": [{ "atm_id": "ATM-001" }] }"#;
        assert!(matches!(FleetConfig::from_json(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_bad_fleet() {
        let cases = [
            r#"{ "thresholds": {"warning_above": 0.2}, "entities": [] }"#,
            r#"{ "thresholds": {"warning_above": 0.2}, "entities": [{"atm_id": "A"}, {"atm_id": "A"}] }"#,
            r#"{ "thresholds": {"warning_above": 0.2}, "entities": [{"atm_id": " "}] }"#,
            r#"{ "thresholds": {"warning_above": 0.2}, "entities": [{"atm_id": "A", "severity": 7}] }"#,
            r#"{ "thresholds": {"warning_above": 0.2}, "entities": [{"atm_id": "A", "severity": []}] }"#,
        ];
        for json in cases {
            assert!(matches!(FleetConfig::from_json(json), Err(ConfigError::Invalid(_))), "{json}");
        }

        let inverted = r#"{ "thresholds": {"warning_above": 0.9, "critical_above": 0.5}, "entities": [{"atm_id": "A"}] }"#;
        assert!(matches!(FleetConfig::from_json(inverted), Err(ConfigError::Thresholds(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "synthesis_mode": "random",
                "thresholds": {{ "warning_above": 0.01 }},
                "entities": [
                    {{ "atm_id": "ATM-100", "override": {{ "tier": "WARNING", "action": "Refill cash" }} }},
                    {{ "atm_id": "ATM-101" }}
                ]
            }}"#
        )
        .unwrap();

        let fleet = FleetConfig::load(file.path()).unwrap();
        assert_eq!(fleet.synthesis_mode, SynthesisMode::Random);
        assert_eq!(fleet.thresholds.warning_above, 0.01);
        assert!(fleet.profiles().is_empty());

        let decision = fleet.status_classifier().classify("ATM-100", 0.0);
        assert_eq!(decision.action, "Refill cash");
    }

    #[test]
    fn test_mode_override() {
        let mut fleet = FleetConfig::reference();
        fleet.apply_mode_override(None).unwrap();
        assert_eq!(fleet.synthesis_mode, SynthesisMode::Profile);

        fleet.apply_mode_override(Some("RANDOM".to_string())).unwrap();
        assert_eq!(fleet.synthesis_mode, SynthesisMode::Random);
        assert_eq!(fleet.synthesizer().mode(), SynthesisMode::Random);
    }

    #[test]
    fn test_unknown_mode_override_is_rejected() {
        let mut fleet = FleetConfig::reference();
        let err = fleet.apply_mode_override(Some("fuzzy".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("fuzzy")), "{err}");
        // unchanged on error
        assert_eq!(fleet.synthesis_mode, SynthesisMode::Profile);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(FleetConfig::load("/nonexistent/fleet.json"), Err(ConfigError::Io { .. })));
    }
}
