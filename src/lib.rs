//! Luxmeter - gateway light sensor polling and averaging service
//!
//! Polls light-level sensors behind a discoverable gateway, converts raw
//! readings to lux, smooths them over a sliding time window, and reports
//! the averaged level plus a fault flag.

pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod io;
pub mod lux;
pub mod output;
pub mod sensor;
pub mod window;

pub use config::{load_config, Config, Settings};
pub use directory::GatewayDirectory;
pub use engine::Engine;
pub use error::{LuxmeterError, Result};
pub use output::{LogOutput, OutputSink};
pub use sensor::SensorReader;
pub use window::SlidingWindow;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::io::ReqwestHttpClient;

/// Run the service with the given configuration.
///
/// Validates the configuration first; an incomplete configuration reports
/// one persistent fault on the output sink and returns the error without
/// scheduling anything. Otherwise polls until ctrl-c.
pub async fn run(config: Config) -> Result<()> {
    let output: Arc<dyn OutputSink> = Arc::new(LogOutput);

    let settings = match config.validate() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid gateway or sensor definition: {}", e);
            output.update_fault(true).await;
            return Err(e);
        }
    };

    tracing::info!(
        "Polling {} sensor(s) behind gateway {} every {:?}, averaging over {:?}",
        settings.sensor_ids.len(),
        settings.gateway_id,
        settings.poll_interval,
        settings.time_window
    );

    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new());
    let cancel = CancellationToken::new();
    let tasks = TaskTracker::new();

    let directory = Arc::new(GatewayDirectory::new(
        settings.gateway_id.clone(),
        settings.discovery_url.clone(),
        Arc::clone(&http),
    ));
    let reader = Arc::new(SensorReader::new(
        Arc::clone(&http),
        Arc::clone(&directory),
        settings.access_key.clone(),
        tasks.clone(),
    ));

    let engine = Arc::new(Engine::new(
        &settings,
        directory,
        reader,
        output,
        cancel.clone(),
        tasks,
    ));

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    tracing::info!("Luxmeter engine started");
    engine.run().await;
    tracing::info!("Luxmeter engine stopped");

    Ok(())
}
