//! Central Configuration Constants
//!
//! Single source of truth for configuration defaults. Every value can be
//! overridden through the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Default status service URL
pub const DEFAULT_STATUS_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Default producer cadence (seconds)
pub const DEFAULT_PUBLISH_INTERVAL: u64 = 5;

/// Default consumer poll cadence (seconds)
pub const DEFAULT_POLL_INTERVAL: u64 = 3;

/// Default HTTP request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ATM Health";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Positive whole seconds, or `default` when unset, unparsable or zero
pub fn parse_secs(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

fn env_secs(name: &str, default: u64) -> u64 {
    parse_secs(std::env::var(name).ok(), default)
}

/// Status service URL from environment or default
pub fn get_status_server_url() -> String {
    std::env::var("STATUS_SERVER_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_STATUS_SERVER_URL.to_string())
}

/// Producer cadence
pub fn get_publish_interval() -> Duration {
    Duration::from_secs(env_secs("PUBLISH_INTERVAL_SECS", DEFAULT_PUBLISH_INTERVAL))
}

/// Consumer poll cadence
pub fn get_poll_interval() -> Duration {
    Duration::from_secs(env_secs("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL))
}

/// HTTP request timeout
pub fn get_request_timeout() -> Duration {
    Duration::from_secs(env_secs("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT))
}

/// Bundled demo classifier artifact
pub fn default_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model").join("failure_model.json")
}

/// Classifier artifact location
pub fn get_model_path() -> PathBuf {
    std::env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_model_path())
}

/// Optional fleet file
pub fn get_fleet_config_path() -> Option<PathBuf> {
    std::env::var("FLEET_CONFIG").ok().filter(|p| !p.is_empty()).map(PathBuf::from)
}

/// Optional synthesis mode override (`profile` | `random`)
pub fn get_synthesis_mode() -> Option<String> {
    std::env::var("SYNTHESIS_MODE").ok().filter(|m| !m.is_empty())
}
