//! Output surface towards the host framework
//!
//! Each polling tick reports at most two values: a smoothed illuminance
//! level and a boolean fault flag. The host supplies the sink; everything
//! else about characteristic wiring lives outside this crate.

use async_trait::async_trait;

/// Receives the per-tick results
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send + Sync {
    /// Report a new smoothed illuminance level, already clamped to
    /// [0, 100000] lux
    async fn update_level(&self, level: u32);

    /// Report the health of the most recent tick
    async fn update_fault(&self, fault: bool);
}

/// Sink that reports results through the log
#[derive(Debug, Default)]
pub struct LogOutput;

#[async_trait]
impl OutputSink for LogOutput {
    async fn update_level(&self, level: u32) {
        tracing::info!("Ambient light level: {} lux", level);
    }

    async fn update_fault(&self, fault: bool) {
        if fault {
            tracing::warn!("Sensor fault reported");
        } else {
            tracing::debug!("Sensor fault cleared");
        }
    }
}
