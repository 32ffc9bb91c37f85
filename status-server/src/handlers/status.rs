//! Query handler

use axum::{extract::State, Json};

use atm_health_core::ResultBatch;

use crate::AppState;

/// GET /status - latest published batch (empty results until the first predict)
pub async fn latest(State(state): State<AppState>) -> Json<ResultBatch> {
    Json(ResultBatch::clone(&state.store.read()))
}
