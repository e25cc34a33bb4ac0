//! Fleet Registry: last-seen bookkeeping for every agent that ever reported
//!
//! Records are never evicted: a host that stops reporting stays visible as
//! DISCONNECTED for the lifetime of the process.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{HostRecord, HostStatus, HostView};

#[derive(Debug, Default)]
pub struct FleetRegistry {
    hosts: RwLock<HashMap<String, HostRecord>>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the record for `hostname`, stamped with the server clock
    pub async fn record_heartbeat(&self, hostname: &str, ip: &str, current_path: &str) {
        self.record_heartbeat_at(hostname, ip, current_path, Utc::now())
            .await
    }

    pub async fn record_heartbeat_at(
        &self,
        hostname: &str,
        ip: &str,
        current_path: &str,
        now: DateTime<Utc>,
    ) {
        let mut hosts = self.hosts.write().await;
        let record = HostRecord {
            hostname: hostname.to_string(),
            ip: ip.to_string(),
            last_seen: now,
            current_path: current_path.to_string(),
        };
        if hosts.insert(hostname.to_string(), record).is_none() {
            info!(hostname = %hostname, ip = %ip, "New host joined the fleet");
        } else {
            debug!(hostname = %hostname, "Heartbeat");
        }
    }

    /// Liveness view of every known host, keyed by hostname
    pub async fn snapshot(&self) -> BTreeMap<String, HostView> {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> BTreeMap<String, HostView> {
        let hosts = self.hosts.read().await;
        hosts
            .values()
            .map(|record| (record.hostname.clone(), host_view(record, now)))
            .collect()
    }

    pub async fn get(&self, hostname: &str) -> Option<HostRecord> {
        self.hosts.read().await.get(hostname).cloned()
    }

    pub async fn len(&self) -> usize {
        self.hosts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hosts.read().await.is_empty()
    }
}

/// Classify one record; a last-seen in the future (clock step) counts as 0s
fn host_view(record: &HostRecord, now: DateTime<Utc>) -> HostView {
    let elapsed = (now - record.last_seen).num_seconds().max(0);
    HostView {
        ip: record.ip.clone(),
        status: HostStatus::from_elapsed_secs(elapsed),
        last_seen: format!("{}s ago", elapsed),
        current_path: record.current_path.clone(),
    }
}
