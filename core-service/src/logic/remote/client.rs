//! Status Service Client
//!
//! HTTP client for the predict/status service: Submit (`POST /predict`) and
//! Query (`GET /status`). No retries; callers try again on their next cycle.

use std::time::Duration;

use crate::constants;
use crate::logic::features::TaggedFeatures;
use crate::logic::model::EngineStatus;
use crate::logic::status::{ClassificationResult, ResultBatch};
use super::wire::{ErrorResponse, HealthResponse, PredictResponse};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: constants::get_status_server_url(),
            timeout: constants::get_request_timeout(),
        }
    }
}

/// Client errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Peer could not be reached (connect failure, timeout, reset)
    #[error("status service unreachable: {0}")]
    TransportUnavailable(String),

    #[error("status service error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Result of a Submit call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Classified(Vec<ClassificationResult>),
    /// Service accepted the call but had nothing to classify
    NoData(String),
}

pub struct StatusClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl StatusClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::TransportUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.server_url, path)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http_client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    /// Submit call: classify a batch and publish it as the latest status
    pub async fn submit(&self, records: &[TaggedFeatures]) -> Result<SubmitOutcome, ClientError> {
        let response = self.http_client
            .post(self.url("/predict"))
            .json(records)
            .send()
            .await
            .map_err(transport_error)?;

        match decode::<PredictResponse>(response).await? {
            PredictResponse::Results(results) => {
                if results.len() != records.len() {
                    return Err(ClientError::Parse(format!(
                        "submitted {} records, got {} results",
                        records.len(),
                        results.len()
                    )));
                }
                Ok(SubmitOutcome::Classified(results))
            }
            PredictResponse::NoData { message } => Ok(SubmitOutcome::NoData(message)),
        }
    }

    /// Query call: latest published batch (empty if none yet)
    pub async fn query(&self) -> Result<ResultBatch, ClientError> {
        let response = self.http_client
            .get(self.url("/status"))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    /// Loaded model metadata and scoring stats
    pub async fn model_status(&self) -> Result<EngineStatus, ClientError> {
        let response = self.http_client
            .get(self.url("/api/v1/model"))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    ClientError::TransportUnavailable(e.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| ClientError::Parse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ClientError::Server { status: status.as_u16(), message })
}
