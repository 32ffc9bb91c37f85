//! Submit handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{Map, Value};

use atm_health_core::logic::features::validate_record_fields;
use atm_health_core::logic::remote::PredictResponse;
use atm_health_core::{log_operational_status, ResultBatch, TaggedFeatures};

use crate::{AppError, AppResult, AppState};

/// POST /predict
///
/// Classifies the submitted records and publishes them as the latest batch.
/// An empty array is not an error and leaves the current batch untouched.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Map<String, Value>>>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(raw) = payload?;

    if raw.is_empty() {
        tracing::debug!("Empty predict request");
        return Ok(Json(PredictResponse::no_data()));
    }

    let records = parse_records(raw)?;
    let results = state.scoring.classify(&records)?;

    let batch = state.store.publish(ResultBatch::new(results.clone()));
    tracing::info!(
        "Published batch {} ({} ATMs)",
        batch.batch_id.map(|id| id.to_string()).unwrap_or_default(),
        batch.len()
    );
    log_operational_status(&results);

    Ok(Json(PredictResponse::Results(results)))
}

fn parse_records(raw: Vec<Map<String, Value>>) -> AppResult<Vec<TaggedFeatures>> {
    raw.into_iter()
        .enumerate()
        .map(|(i, record)| {
            validate_record_fields(record.keys().map(String::as_str))
                .map_err(|e| AppError::SchemaMismatch(format!("record {}: schema mismatch: {}", i, e)))?;
            serde_json::from_value(Value::Object(record))
                .map_err(|e| AppError::Validation(format!("record {}: {}", i, e)))
        })
        .collect()
}
