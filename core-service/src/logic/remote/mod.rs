//! Remote Module - boundary interface between producer, service and consumer
//!
//! This module handles:
//! - Submitting synthesized batches for classification
//! - Querying the latest published batch
//! - Service health and model status

pub mod client;
pub mod wire;

pub use client::{ClientConfig, ClientError, StatusClient, SubmitOutcome};
pub use wire::{ErrorResponse, HealthResponse, PredictResponse, NO_DATA_MESSAGE};
