//! Polling engine
//!
//! Runs the aggregation cycle: one tick resolves the gateway address, reads
//! every configured sensor, combines the readings into a single lux value,
//! feeds the sliding window, and reports the smoothed level plus a fault
//! flag. The scheduler fires one tick immediately and then on a fixed
//! interval; it never waits for a tick to finish before arming the next
//! one, so slow ticks may overlap. The window is the only state that must
//! not see interleaved mutation, and it sits behind a mutex.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::directory::GatewayDirectory;
use crate::output::OutputSink;
use crate::sensor::SensorReader;
use crate::window::SlidingWindow;

/// Largest level the output surface accepts, in lux
const MAX_LEVEL: f64 = 100_000.0;

/// Round a window mean to the reportable integer range
pub fn clamp_level(mean: f64) -> u32 {
    mean.round().clamp(0.0, MAX_LEVEL) as u32
}

/// Drives the periodic aggregation cycle
pub struct Engine {
    sensor_ids: Vec<String>,
    poll_interval: Duration,
    directory: Arc<GatewayDirectory>,
    reader: Arc<SensorReader>,
    window: Mutex<SlidingWindow>,
    output: Arc<dyn OutputSink>,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl Engine {
    pub fn new(
        settings: &Settings,
        directory: Arc<GatewayDirectory>,
        reader: Arc<SensorReader>,
        output: Arc<dyn OutputSink>,
        cancel: CancellationToken,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            sensor_ids: settings.sensor_ids.clone(),
            poll_interval: settings.poll_interval,
            directory,
            reader,
            window: Mutex::new(SlidingWindow::new(settings.window_capacity())),
            output,
            cancel,
            tasks,
        }
    }

    /// Run the scheduler until the cancellation token fires.
    ///
    /// The first tick fires immediately. Every firing spawns the tick onto
    /// the task tracker without awaiting the previous one. On cancellation
    /// the tracker is drained so no tick or discovery-refresh task is left
    /// dangling.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let engine = Arc::clone(&self);
                    self.tasks.spawn(async move {
                        engine.tick().await;
                    });
                }
                _ = self.cancel.cancelled() => {
                    debug!("Polling stopped: shutdown signal received");
                    break;
                }
            }
        }

        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Execute one aggregation cycle
    pub async fn tick(&self) {
        let address = match self.directory.ensure_address().await {
            Some(address) => address,
            None => {
                warn!("Failed to find gateway, check configuration or try again later");
                let _window = self.window.lock().await;
                self.output.update_fault(true).await;
                return;
            }
        };

        let mut sum = 0.0;
        for sensor_id in &self.sensor_ids {
            if let Some(lux) = self.reader.read_one(&address, sensor_id).await {
                sum += lux;
            }
        }

        // Failed sensors contribute nothing to the numerator but still
        // count in the denominator. Inherited behavior, kept as-is.
        let combined = sum / self.sensor_ids.len() as f64;

        // The lock is held across the emit: with overlapping ticks, a tick
        // that pushed later must not have its fresher mean overwritten by
        // an earlier tick's stale one, and a level/fault pair must reach
        // the host without another tick's outputs interleaved
        let mut window = self.window.lock().await;
        if combined > 0.0 {
            window.push(combined);
            if let Some(mean) = window.mean() {
                self.output.update_level(clamp_level(mean)).await;
            }
            self.output.update_fault(false).await;
        } else {
            // All sensors failed (or reported a level that vanishes to 0);
            // the window keeps its previous contents
            debug!("No usable sensor reading this tick");
            self.output.update_fault(true).await;
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("sensor_ids", &self.sensor_ids)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
