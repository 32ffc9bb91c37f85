//! Wire types shared by the status service and its clients

use serde::{Deserialize, Serialize};

use crate::logic::status::ClassificationResult;

/// Message returned by `POST /predict` for an empty submission
pub const NO_DATA_MESSAGE: &str = "No ATM data received";

/// `POST /predict` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Results(Vec<ClassificationResult>),
    NoData { message: String },
}

impl PredictResponse {
    pub fn no_data() -> Self {
        Self::NoData { message: NO_DATA_MESSAGE.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
