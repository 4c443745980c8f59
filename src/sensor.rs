//! Per-sensor light level reader
//!
//! Fetches one sensor's current state through the gateway and converts the
//! raw light level to lux. Each polling tick gets exactly one attempt per
//! sensor; there are no retries. An unreachable gateway additionally
//! submits a fire-and-forget discovery refresh, since a fetch failure often
//! means the gateway changed address.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::warn;

use crate::directory::GatewayDirectory;
use crate::io::HttpClient;
use crate::lux::raw_to_lux;

/// Reads individual sensors through the gateway
pub struct SensorReader {
    http: Arc<dyn HttpClient>,
    directory: Arc<GatewayDirectory>,
    access_key: String,
    tasks: TaskTracker,
}

impl SensorReader {
    /// Create a reader.
    ///
    /// `tasks` tracks the fire-and-forget refresh tasks so shutdown can
    /// drain them.
    pub fn new(
        http: Arc<dyn HttpClient>,
        directory: Arc<GatewayDirectory>,
        access_key: String,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            http,
            directory,
            access_key,
            tasks,
        }
    }

    /// Read one sensor's current light level in lux.
    ///
    /// Returns None when the fetch fails or the reported level is not
    /// numeric; failures are logged, never propagated.
    pub async fn read_one(&self, address: &str, sensor_id: &str) -> Option<f64> {
        let url = format!(
            "http://{}/api/{}/sensors/{}",
            address, self.access_key, sensor_id
        );

        let body = match self.http.get(&url).await {
            Ok(response) if (200..300).contains(&response.status) => response.body,
            Ok(response) => {
                warn!(
                    "Failed to get sensor light level: sensor {} returned status {}",
                    sensor_id, response.status
                );
                self.spawn_refresh();
                return None;
            }
            Err(e) => {
                warn!("Failed to get sensor light level: sensor {}: {}", sensor_id, e);
                self.spawn_refresh();
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to get sensor light level: sensor {}: {}", sensor_id, e);
                self.spawn_refresh();
                return None;
            }
        };

        let state = match value.get("state") {
            Some(state) => state,
            None => {
                warn!(
                    "Failed to get sensor light level: sensor {} response has no state",
                    sensor_id
                );
                self.spawn_refresh();
                return None;
            }
        };

        match state.get("lightlevel").and_then(serde_json::Value::as_f64) {
            Some(raw_level) => Some(raw_to_lux(raw_level)),
            None => {
                // Reachable sensor with a bogus reading; not a transport
                // problem, so no discovery refresh
                warn!("Invalid sensor light level from sensor {}", sensor_id);
                None
            }
        }
    }

    /// Submit a discovery refresh without awaiting it.
    ///
    /// The refresh outcome never changes the current read's result; the
    /// task is tracked so shutdown can wait for it.
    fn spawn_refresh(&self) {
        let directory = Arc::clone(&self.directory);
        self.tasks.spawn(async move {
            directory.refresh().await;
        });
    }
}

impl std::fmt::Debug for SensorReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorReader").finish_non_exhaustive()
    }
}
