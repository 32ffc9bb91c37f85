//! ATM Health - terminal dashboard
//!
//! Polls the status service and prints the latest batch.

use std::process::ExitCode;
use std::sync::Arc;

use atm_health_core::constants::{self, APP_NAME, APP_VERSION};
use atm_health_core::logic::dashboard::Dashboard;
use atm_health_core::logic::remote::{ClientConfig, StatusClient};
use atm_health_core::logic::scheduler::Recurring;
use atm_health_core::FleetConfig;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::info!("Starting {} dashboard v{}...", APP_NAME, APP_VERSION);

    // locations only; a bad fleet file should not stop the dashboard
    let fleet = FleetConfig::from_env().unwrap_or_else(|e| {
        log::warn!("Fleet config unavailable ({}), using reference fleet", e);
        FleetConfig::reference()
    });

    let client = match StatusClient::new(ClientConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let schedule = Recurring::new("dashboard", constants::get_poll_interval());
    let task = Dashboard::new(client).spawn(schedule, Arc::new(fleet));

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    task.stop().await;

    ExitCode::SUCCESS
}
