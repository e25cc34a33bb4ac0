//! Coordination Service: composes fleet, command, policy and forensic state
//!
//! Serves the three agent-facing flows:
//!   - heartbeat: refresh the host record, hand back (and clear) its pending command
//!   - breach ingestion: persist evidence first, then apply the host's auto-lock policy
//!   - policy update: whole-object replace of the global or a per-host policy

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::domain::{normalize_image_ref, Command, HostView, LogEntry, Policy, PolicyScope};
use crate::error::Result;
use crate::persistence::ForensicLog;

use super::command_queue::CommandQueue;
use super::fleet_registry::FleetRegistry;
use super::policy_store::PolicyStore;

/// Breach report as received from an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachReport {
    pub hostname: String,
    pub file_path: String,
    pub image: Option<String>,
}

/// What ingestion did with a breach report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub entry: LogEntry,
    pub lock_queued: bool,
}

pub struct CoordinationService {
    fleet: FleetRegistry,
    commands: CommandQueue,
    policies: PolicyStore,
    log: ForensicLog,
}

impl CoordinationService {
    pub fn new(global_policy: Policy, log: ForensicLog) -> Self {
        Self::with_components(
            FleetRegistry::new(),
            CommandQueue::new(),
            PolicyStore::new(global_policy),
            log,
        )
    }

    pub fn with_components(
        fleet: FleetRegistry,
        commands: CommandQueue,
        policies: PolicyStore,
        log: ForensicLog,
    ) -> Self {
        Self {
            fleet,
            commands,
            policies,
            log,
        }
    }

    pub fn command_queue(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn policy_store(&self) -> &PolicyStore {
        &self.policies
    }

    /// Record liveness for `hostname` and drain its command slot
    pub async fn heartbeat(&self, hostname: &str, ip: &str, current_path: &str) -> Option<Command> {
        self.fleet.record_heartbeat(hostname, ip, current_path).await;
        let command = self.commands.consume(hostname);
        if let Some(command) = command {
            info!(hostname = %hostname, command = %command, "Delivering command");
        }
        command
    }

    /// Persist a breach and queue a lock if the host's policy asks for one
    ///
    /// A failed append is returned to the caller and no command is queued:
    /// the evidence write is the one step that must not fail silently.
    pub async fn ingest(&self, report: BreachReport) -> Result<IngestOutcome> {
        let entry = LogEntry::breach_now(
            &report.hostname,
            &report.file_path,
            normalize_image_ref(report.image),
        );
        if let Err(e) = self.log.append(&entry).await {
            warn!(
                hostname = %report.hostname,
                file = %report.file_path,
                "Breach not recorded: {}",
                e
            );
            return Err(e);
        }

        warn!(
            hostname = %entry.hostname,
            file = %entry.file,
            image = ?entry.image,
            "CRITICAL BREACH recorded"
        );

        let policy = self.policies.resolve(&report.hostname).await;
        let lock_queued = policy.auto_lock;
        if lock_queued {
            self.commands.enqueue(&report.hostname, Command::LockWorkstation);
        }

        Ok(IngestOutcome { entry, lock_queued })
    }

    pub async fn resolve_policy(&self, hostname: &str) -> Policy {
        self.policies.resolve(hostname).await
    }

    pub async fn global_policy(&self) -> Policy {
        self.policies.global().await
    }

    pub async fn update_policy(&self, scope: PolicyScope, policy: Policy) {
        self.policies.apply(scope, policy).await
    }

    /// Administrative command for one host (overwrites anything pending)
    pub fn queue_command(&self, hostname: &str, command: Command) {
        self.commands.enqueue(hostname, command);
    }

    pub async fn fleet(&self) -> BTreeMap<String, HostView> {
        self.fleet.snapshot().await
    }

    pub async fn logs(&self) -> Result<Vec<LogEntry>> {
        self.log.list().await
    }

    pub async fn delete_log(&self, time: &str, file: &str) -> Result<usize> {
        self.log.delete_matching(time, file).await
    }

    pub async fn purge_logs(&self) -> Result<()> {
        self.log.purge().await
    }
}
