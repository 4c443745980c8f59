//! Configuration types for the luxmeter service

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Raw configuration as supplied by the host
///
/// Field names follow the host's camelCase convention. Required fields are
/// optional here so that an incomplete file still deserializes; completeness
/// is checked by [`Config::validate`], which is the only way to obtain
/// runnable [`Settings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    /// Identifier of the gateway in the discovery service
    #[serde(default)]
    pub bridge_id: Option<String>,
    /// Pre-provisioned access key for gateway requests
    #[serde(default)]
    pub bridge_key: Option<String>,
    /// Single sensor identifier
    #[serde(default)]
    pub sensor_id: Option<String>,
    /// Multiple sensor identifiers; takes precedence over `sensorId`
    #[serde(default)]
    pub sensor_ids: Option<Vec<String>>,
    /// Averaging window in seconds
    #[serde(default = "default_time_window")]
    pub time_window: u64,
    /// Polling interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Gateway discovery endpoint
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            bridge_id: None,
            bridge_key: None,
            sensor_id: None,
            sensor_ids: None,
            time_window: default_time_window(),
            poll_interval: default_poll_interval(),
            discovery_url: default_discovery_url(),
        }
    }
}

fn default_name() -> String {
    "Light Sensor Average".to_string()
}

fn default_time_window() -> u64 {
    900
}

fn default_poll_interval() -> u64 {
    30
}

fn default_discovery_url() -> String {
    "https://discovery.meethue.com/".to_string()
}

/// Validated, normalized configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub name: String,
    pub gateway_id: String,
    pub access_key: String,
    /// Non-empty, in configured order
    pub sensor_ids: Vec<String>,
    pub time_window: Duration,
    pub poll_interval: Duration,
    pub discovery_url: String,
}

impl Config {
    /// Check completeness and normalize into [`Settings`].
    ///
    /// Fails on a missing gateway id, access key, or sensor list; the caller
    /// must treat this as fatal and never start polling.
    pub fn validate(&self) -> crate::Result<Settings> {
        let gateway_id = self
            .bridge_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| crate::LuxmeterError::Config("bridgeId is required".to_string()))?;

        let access_key = self
            .bridge_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| crate::LuxmeterError::Config("bridgeKey is required".to_string()))?;

        let sensor_ids = match (&self.sensor_ids, &self.sensor_id) {
            (Some(ids), _) if !ids.is_empty() => ids.clone(),
            (_, Some(id)) if !id.is_empty() => vec![id.clone()],
            _ => {
                return Err(crate::LuxmeterError::Config(
                    "sensorId or sensorIds is required".to_string(),
                ))
            }
        };

        Ok(Settings {
            name: self.name.clone(),
            gateway_id,
            access_key,
            sensor_ids,
            time_window: Duration::from_secs(self.time_window),
            poll_interval: Duration::from_secs(self.poll_interval.max(1)),
            discovery_url: self.discovery_url.clone(),
        })
    }
}

impl Settings {
    /// Number of readings the averaging window holds
    ///
    /// One reading per poll over the configured time window, never less
    /// than one.
    pub fn window_capacity(&self) -> usize {
        let capacity = self.time_window.as_secs() / self.poll_interval.as_secs();
        (capacity as usize).max(1)
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::LuxmeterError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
