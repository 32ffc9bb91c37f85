//! ATM Health - simulator
//!
//! Synthesizes telemetry for the tracked fleet and submits it to the status
//! service every publish interval.

use std::process::ExitCode;

use atm_health_core::constants::{self, APP_NAME, APP_VERSION};
use atm_health_core::logic::pipeline::{Producer, RemoteSink};
use atm_health_core::logic::remote::{ClientConfig, StatusClient};
use atm_health_core::logic::scheduler::Recurring;
use atm_health_core::FleetConfig;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} simulator v{}...", APP_NAME, APP_VERSION);

    let fleet = match FleetConfig::from_env() {
        Ok(fleet) => fleet,
        Err(e) => {
            log::error!("Fleet config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match StatusClient::new(ClientConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Submitting to {}", client.server_url());

    match client.health_check().await {
        Ok(health) => log::info!("Status service {} ({})", health.status, health.version),
        // not fatal: each cycle retries on its own
        Err(e) => log::warn!("Status service not reachable yet: {}", e),
    }

    let producer = Producer::new(fleet.tracked_ids(), fleet.synthesizer(), RemoteSink::new(client));
    let schedule = Recurring::new("simulator", constants::get_publish_interval());
    let (_, task) = producer.spawn(schedule);

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    let cycles = task.stop().await;
    log::info!("Simulator stopped after {} cycles", cycles);

    ExitCode::SUCCESS
}
