//! Classifier info handler

use axum::{extract::State, Json};

use atm_health_core::logic::model::EngineStatus;

use crate::AppState;

/// GET /api/v1/model
pub async fn info(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.scoring.engine().status())
}
