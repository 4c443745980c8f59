//! Gateway directory
//!
//! Resolves the configured gateway identifier to a network address through
//! the external discovery service and caches the result. A single directory
//! instance is shared by everything that needs the address, so one
//! successful discovery serves all sensors behind the same gateway.
//!
//! Discovery attempts are rate limited: at least 15 whole minutes must pass
//! between attempts, counted at minute granularity from the last attempt
//! regardless of its outcome. A failed discovery keeps whatever address was
//! cached before; staleness self-corrects on the next eligible attempt.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::io::HttpClient;

/// Minimum gap between discovery attempts, in whole minutes
const DISCOVERY_THROTTLE_MINUTES: u64 = 15;

/// One record returned by the discovery service
#[derive(Debug, Deserialize)]
struct DiscoveryRecord {
    id: String,
    #[serde(rename = "internalipaddress")]
    internal_ip_address: String,
}

#[derive(Debug, Default)]
struct DirectoryState {
    address: Option<String>,
    last_attempt_minute: Option<u64>,
}

/// Shared gateway address cache with throttled discovery
pub struct GatewayDirectory {
    gateway_id: String,
    discovery_url: String,
    http: Arc<dyn HttpClient>,
    state: Mutex<DirectoryState>,
}

impl GatewayDirectory {
    pub fn new(gateway_id: String, discovery_url: String, http: Arc<dyn HttpClient>) -> Self {
        Self {
            gateway_id,
            discovery_url,
            http,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// The cached gateway address, if any, without network access
    pub async fn cached_address(&self) -> Option<String> {
        self.state.lock().await.address.clone()
    }

    /// Return the cached address, attempting discovery first if none is known.
    ///
    /// May still return None: discovery can fail, find no matching gateway,
    /// or be rate limited.
    pub async fn ensure_address(&self) -> Option<String> {
        if let Some(address) = self.cached_address().await {
            return Some(address);
        }
        self.refresh().await;
        self.cached_address().await
    }

    /// Attempt a discovery call, subject to the rate limit.
    ///
    /// Called on a schedule gap (no cached address) and as a self-healing
    /// measure after a failed sensor fetch, in case the gateway changed
    /// address.
    pub async fn refresh(&self) {
        self.refresh_at(current_minute()).await;
    }

    /// Rate-limited discovery with the clock supplied by the caller
    async fn refresh_at(&self, now_minute: u64) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_attempt_minute {
            if now_minute.saturating_sub(last) < DISCOVERY_THROTTLE_MINUTES {
                debug!(
                    "Discovery rate limited, last attempt {} minute(s) ago",
                    now_minute.saturating_sub(last)
                );
                return;
            }
        }

        // The attempt counts against the throttle whether or not it succeeds
        state.last_attempt_minute = Some(now_minute);

        match self.fetch_records().await {
            Ok(records) => {
                let mut matched = None;
                for record in records {
                    if record.id == self.gateway_id {
                        matched = Some(record.internal_ip_address);
                    }
                }
                match matched {
                    Some(address) => {
                        info!("Discovered gateway {} at {}", self.gateway_id, address);
                        state.address = Some(address);
                    }
                    None => {
                        warn!("Discovery response contained no gateway {}", self.gateway_id);
                    }
                }
            }
            Err(e) => {
                warn!("Error obtaining gateway address: {}", e);
            }
        }
    }

    async fn fetch_records(&self) -> crate::Result<Vec<DiscoveryRecord>> {
        let response = self.http.get(&self.discovery_url).await?;
        if !(200..300).contains(&response.status) {
            return Err(crate::LuxmeterError::Discovery(format!(
                "Discovery endpoint returned status {}",
                response.status
            )));
        }
        let records = serde_json::from_str(&response.body)?;
        Ok(records)
    }
}

impl std::fmt::Debug for GatewayDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayDirectory")
            .field("gateway_id", &self.gateway_id)
            .field("discovery_url", &self.discovery_url)
            .finish_non_exhaustive()
    }
}

fn current_minute() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        / 60
}
