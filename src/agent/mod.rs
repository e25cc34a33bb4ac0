//! Endpoint sensor
//!
//! Runs on each protected workstation:
//! - Heartbeats to the vault and executes queued commands (lock / wipe)
//! - Keeps a set of path watchers in sync with the host's effective policy
//! - Reports canary modifications with a best-effort screenshot

pub mod actions;
pub mod client;
pub mod identity;
pub mod sensor;
pub mod watcher;
pub mod wipe;

pub use actions::{HostActions, OsHostActions};
pub use client::{VaultApi, VaultClient, VaultClientConfig};
pub use identity::{resolve_hostname, resolve_ip};
pub use sensor::{BreachReporter, Sensor, SensorConfig};
pub use watcher::{BreachEvent, PollingBackend, WatchBackend, WatcherHandle};
pub use wipe::{wipe_paths, WipeGuard, WipeReport};

use std::sync::Arc;
use std::time::Duration;

use crate::config::AgentConfig;
use crate::error::Result;

/// Wire a sensor from configuration, using the stock OS actions and polling watcher
pub fn build_sensor(config: &AgentConfig) -> Result<Sensor> {
    let client = VaultClient::new(VaultClientConfig {
        base_url: config.vault_url.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
    })?;

    let sensor_config = SensorConfig {
        hostname: resolve_hostname(config.hostname.as_deref()),
        ip: resolve_ip(config.ip.as_deref()),
        cycle: Duration::from_secs(config.cycle_secs),
        screenshots_dir: config.screenshots_dir.clone(),
        wipe_guard: WipeGuard::new(config.protected_markers.clone()),
    };

    Ok(Sensor::new(
        sensor_config,
        Arc::new(client),
        Arc::new(OsHostActions::new()),
        Arc::new(PollingBackend::new(Duration::from_millis(
            config.watch_poll_ms,
        ))),
    ))
}
