//! Praxis API Server
//!
//! HTTP API for description, dataset and combined quality evaluations.
//! Stateless apart from in-memory score caches; can be horizontally scaled.

use dotenvy::dotenv;
use praxis::config::Config;
use praxis::core::http::start_server;
use praxis::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env()?;
    let port = config.port;
    info!("Starting Praxis API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    info!(
        timeout_ms = config.oracle.timeout.as_millis() as u64,
        max_retries = config.oracle.max_retries,
        "Oracle call budget"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
