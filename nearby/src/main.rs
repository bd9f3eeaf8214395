//! Nearby Service Main Entry Point
//!
//! Wires the nearby product discovery services and runs the intent
//! evaluation worker until interrupted.

use dotenv::dotenv;
use nearby::config::LogFormat;
use nearby::{Dependencies, NearbyError, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), NearbyError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nearby=info,nearby_repository=info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .try_init()
                .map_err(|e| NearbyError::config(format!("Failed to init tracing: {}", e)))?;

            info!(
                service_name = "nearby",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with JSON format"
            );
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .try_init()
                .map_err(|e| NearbyError::config(format!("Failed to init tracing: {}", e)))?;

            info!(
                service_name = "nearby",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with console output"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), NearbyError> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    info!("Starting nearby service");

    let mut deps = Dependencies::new(&settings).await;
    info!("Dependencies initialized successfully");

    let worker_handle = deps.worker.take().map(|worker| tokio::spawn(worker.run()));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Received shutdown signal");
    let _ = deps.shutdown_tx.send(());

    if let Some(handle) = worker_handle {
        match handle.await {
            Ok(processed) => info!(events_processed = processed, "Evaluation worker finished"),
            Err(e) => {
                error!(error = %e, "Evaluation worker panicked");
                return Err(NearbyError::config(format!("Evaluation worker failed: {}", e)));
            }
        }
    }

    info!("Nearby service stopped");
    Ok(())
}
