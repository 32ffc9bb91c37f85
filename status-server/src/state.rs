//! Shared application state

use atm_health_core::{ResultStore, ScoringPipeline};

#[derive(Debug, Clone)]
pub struct AppState {
    pub scoring: ScoringPipeline,
    /// Latest published batch, replaced on every predict
    pub store: ResultStore,
}

impl AppState {
    pub fn new(scoring: ScoringPipeline) -> Self {
        Self { scoring, store: ResultStore::new() }
    }
}
