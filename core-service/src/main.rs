//! ATM Health - standalone entry point
//!
//! Producer and dashboard in one process, sharing a [`ResultStore`]
//! instead of going through the status service.

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use atm_health_core::constants::{self, APP_NAME, APP_VERSION};
use atm_health_core::logic::dashboard::Dashboard;
use atm_health_core::logic::pipeline::{LocalSink, Producer};
use atm_health_core::logic::scheduler::Recurring;
use atm_health_core::{FleetConfig, InferenceEngine, ResultStore, ScoringPipeline};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{} (standalone)...", APP_NAME, APP_VERSION);

    let fleet = match FleetConfig::from_env() {
        Ok(fleet) => Arc::new(fleet),
        Err(e) => {
            log::error!("Fleet config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let model_path = constants::get_model_path();
    let engine = match InferenceEngine::load(&model_path) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to load classifier {}: {}", model_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Classifier loaded: {:?}", engine);

    let store = ResultStore::new();
    let shutdown = CancellationToken::new();

    let producer = Producer::new(
        fleet.tracked_ids(),
        fleet.synthesizer(),
        LocalSink::new(ScoringPipeline::new(engine, fleet.status_classifier()), store.clone()),
    );
    let (_, producer_task) = producer.spawn(Recurring::with_token(
        "producer",
        constants::get_publish_interval(),
        shutdown.child_token(),
    ));

    let dashboard_task = Dashboard::new(store).spawn(
        Recurring::with_token("dashboard", constants::get_poll_interval(), shutdown.child_token()),
        fleet,
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutting down...");
    shutdown.cancel();

    let cycles = producer_task.stop().await;
    let polls = dashboard_task.stop().await;
    log::info!("Stopped after {} producer cycles, {} dashboard polls", cycles, polls);

    ExitCode::SUCCESS
}
