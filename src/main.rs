//! Luxmeter CLI
//!
//! Command-line interface for the gateway light sensor polling service.

use std::path::PathBuf;

use clap::Parser;
use luxmeter::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "luxmeter")]
#[command(about = "Gateway light sensor polling and averaging service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Polling interval in seconds (overrides config file)
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Averaging window in seconds (overrides config file)
    #[arg(long)]
    time_window: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, poll_interval={:?}, time_window={:?}, log_level={:?}",
        args.config,
        args.poll_interval,
        args.time_window,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(poll_interval) = args.poll_interval {
        config.poll_interval = poll_interval;
    }
    if let Some(time_window) = args.time_window {
        config.time_window = time_window;
    }

    tracing::info!("Starting luxmeter service '{}'", config.name);

    luxmeter::run(config).await?;

    Ok(())
}
