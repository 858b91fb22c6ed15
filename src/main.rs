//! # Parallel Jobs - Entry Point
//! src/main.rs
//!
//! Carga la configuración, levanta el pool de workers y atiende HTTP
//! hasta que el proceso termina.

use parallel_jobs::config::Config;
use parallel_jobs::jobs::{CoordinatorConfig, JobCoordinator};
use parallel_jobs::server::Server;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "parallel_jobs=info".into()))
        .with(fmt::layer())
        .init();

    let config = Config::new();
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }
    config.log_summary();

    let coordinator = Arc::new(JobCoordinator::new(CoordinatorConfig::from_config(&config)));
    if let Err(e) = coordinator.initialize() {
        error!(error = %e, "failed to start worker pool");
        return ExitCode::FAILURE;
    }

    let server = match Server::bind(&config, Arc::clone(&coordinator)) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, address = %config.address(), "failed to bind");
            coordinator.shutdown();
            return ExitCode::FAILURE;
        }
    };

    let result = server.run();
    let abandoned = coordinator.shutdown();
    info!(abandoned, "worker pool stopped");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal server error");
            ExitCode::FAILURE
        }
    }
}
