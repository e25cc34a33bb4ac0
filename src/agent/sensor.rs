//! Remote sensor: the agent control loop
//!
//! Every cycle (default 5s):
//!   1. heartbeat, executing any command the vault hands back
//!   2. fetch the host's effective policy (separate round trip)
//!   3. rebuild the watcher set if watch paths or extensions changed
//!   4. sleep out the rest of the cycle
//!
//! Network failures are logged and the loop simply waits for the next
//! cycle: no retry, no backoff. Breach events from the watchers are handled
//! by a separate reporter task so a slow capture never delays a heartbeat.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::actions::HostActions;
use super::client::VaultApi;
use super::watcher::{BreachEvent, WatchBackend, WatcherHandle};
use super::wipe::{wipe_paths, WipeGuard};
use crate::api::types::{AlertRequest, HeartbeatRequest};
use crate::domain::{snapshot_file_name, Command, Policy, SensorState};
use crate::error::Result;

const BREACH_CHANNEL_CAPACITY: usize = 256;

/// Sensor settings
#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub hostname: String,
    pub ip: String,
    /// Control-loop cadence
    pub cycle: Duration,
    /// Where breach screenshots are written
    pub screenshots_dir: PathBuf,
    pub wipe_guard: WipeGuard,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            hostname: "UNKNOWN".to_string(),
            ip: "127.0.0.1".to_string(),
            cycle: Duration::from_secs(5),
            screenshots_dir: PathBuf::from("vault/screenshots"),
            wipe_guard: WipeGuard::default(),
        }
    }
}

/// Turns breach events into vault alerts
///
/// Events from a watcher set older than `generation` are dropped unreported.
#[derive(Clone)]
pub struct BreachReporter {
    hostname: String,
    screenshots_dir: PathBuf,
    api: Arc<dyn VaultApi>,
    actions: Arc<dyn HostActions>,
    generation: Arc<AtomicU64>,
}

impl BreachReporter {
    pub fn new(
        hostname: String,
        screenshots_dir: PathBuf,
        api: Arc<dyn VaultApi>,
        actions: Arc<dyn HostActions>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            hostname,
            screenshots_dir,
            api,
            actions,
            generation,
        }
    }

    /// Whether `event` came from the watcher set currently installed
    pub fn is_current(&self, event: &BreachEvent) -> bool {
        event.generation == self.generation.load(Ordering::Acquire)
    }

    /// Capture (best effort) and report one breach; failures are only logged
    pub async fn handle(&self, event: &BreachEvent) {
        warn!(path = %event.path.display(), "Canary tripped");

        let image = self.capture().await;
        let alert = AlertRequest {
            hostname: Some(self.hostname.clone()),
            file_path: Some(event.path.to_string_lossy().to_string()),
            image,
        };

        if let Err(e) = self.api.report_breach(&alert).await {
            warn!(path = %event.path.display(), "Breach report not delivered: {}", e);
        }
    }

    async fn capture(&self) -> Option<String> {
        let name = snapshot_file_name(Utc::now().timestamp(), &self.hostname);
        let dest = self.screenshots_dir.join(&name);
        match self.actions.capture_screen(&dest).await {
            Ok(()) => Some(name),
            Err(e) => {
                debug!("Screen capture skipped: {}", e);
                None
            }
        }
    }

    pub async fn run(self, mut events: mpsc::Receiver<BreachEvent>) {
        while let Some(event) = events.recv().await {
            if !self.is_current(&event) {
                debug!(path = %event.path.display(), "Dropping event from a replaced watch set");
                continue;
            }
            self.handle(&event).await;
        }
    }
}

pub struct Sensor {
    config: SensorConfig,
    api: Arc<dyn VaultApi>,
    actions: Arc<dyn HostActions>,
    backend: Arc<dyn WatchBackend>,
    state: SensorState,
    applied_paths: Vec<String>,
    applied_exts: Vec<String>,
    watchers: Vec<WatcherHandle>,
    generation: Arc<AtomicU64>,
    breach_tx: mpsc::Sender<BreachEvent>,
    breach_rx: Option<mpsc::Receiver<BreachEvent>>,
}

impl Sensor {
    pub fn new(
        config: SensorConfig,
        api: Arc<dyn VaultApi>,
        actions: Arc<dyn HostActions>,
        backend: Arc<dyn WatchBackend>,
    ) -> Self {
        let (breach_tx, breach_rx) = mpsc::channel(BREACH_CHANNEL_CAPACITY);
        Self {
            config,
            api,
            actions,
            backend,
            state: SensorState::Idle,
            applied_paths: Vec::new(),
            applied_exts: Vec::new(),
            watchers: Vec::new(),
            generation: Arc::new(AtomicU64::new(0)),
            breach_tx,
            breach_rx: Some(breach_rx),
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn applied_paths(&self) -> &[String] {
        &self.applied_paths
    }

    pub fn applied_extensions(&self) -> &[String] {
        &self.applied_exts
    }

    pub fn active_watchers(&self) -> usize {
        self.watchers.len()
    }

    /// Spawn the breach reporter; only the first call starts one
    pub fn start_reporter(&mut self) -> Option<JoinHandle<()>> {
        let rx = self.breach_rx.take()?;
        let reporter = BreachReporter::new(
            self.config.hostname.clone(),
            self.config.screenshots_dir.clone(),
            self.api.clone(),
            self.actions.clone(),
            self.generation.clone(),
        );
        Some(tokio::spawn(reporter.run(rx)))
    }

    /// Run the control loop for the lifetime of the process
    pub async fn run(mut self) {
        let _reporter = self.start_reporter();
        info!(
            hostname = %self.config.hostname,
            ip = %self.config.ip,
            cycle_secs = self.config.cycle.as_secs(),
            "Sensor online"
        );

        loop {
            let deadline = Instant::now() + self.config.cycle;
            self.run_cycle().await;
            tokio::time::sleep_until(deadline).await;
        }
    }

    /// One sync pass: heartbeat + command, policy fetch, reconcile
    pub async fn run_cycle(&mut self) {
        self.transition(SensorState::Syncing);
        if let Err(e) = self.sync().await {
            warn!("Comms error: {}", e);
        }
        self.transition(SensorState::Monitoring);
    }

    async fn sync(&mut self) -> Result<()> {
        let heartbeat = HeartbeatRequest {
            hostname: self.config.hostname.clone(),
            ip: self.config.ip.clone(),
            current_path: format!("{:?}", self.applied_paths),
        };
        if let Some(command) = self.api.heartbeat(&heartbeat).await? {
            self.execute(command).await;
        }

        let policy = self.api.fetch_policy(&self.config.hostname).await?;
        self.reconcile(&policy).await
    }

    /// Carry out a command from the vault; failures are logged, never fatal
    pub async fn execute(&mut self, command: Command) {
        info!(command = %command, "Executing vault command");
        match command {
            Command::LockWorkstation => {
                if let Err(e) = self.actions.lock_session().await {
                    error!("Workstation lock failed: {}", e);
                }
            }
            Command::WipeCanaries => {
                let report = wipe_paths(&self.applied_paths, &self.config.wipe_guard).await;
                info!(
                    removed = report.removed.len(),
                    protected = report.protected.len(),
                    failed = report.failed.len(),
                    "Canary wipe finished"
                );
            }
        }
    }

    /// Rebuild watchers when the watch paths or extensions differ from what is applied
    ///
    /// Every old watcher has fully stopped before the first new one starts,
    /// and events the old set left in the channel are never reported.
    pub async fn reconcile(&mut self, policy: &Policy) -> Result<()> {
        if !policy.differs_from(&self.applied_paths, &self.applied_exts) {
            return Ok(());
        }

        self.stop_watchers().await;
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.applied_paths = policy.watch_paths.clone();
        self.applied_exts = policy.extensions.clone();

        for path in &self.applied_paths {
            let path = Path::new(path);
            if !path.exists() {
                debug!(path = %path.display(), "Watch path missing, not watched");
                continue;
            }
            match self
                .backend
                .watch(
                    path,
                    self.applied_exts.clone(),
                    generation,
                    self.breach_tx.clone(),
                )
            {
                Ok(handle) => self.watchers.push(handle),
                Err(e) => warn!(path = %path.display(), "Failed to start watcher: {}", e),
            }
        }

        info!(
            paths = ?self.applied_paths,
            extensions = ?self.applied_exts,
            watchers = self.watchers.len(),
            "Watch set applied"
        );
        Ok(())
    }

    /// Stop every active watcher and wait for each to exit
    pub async fn stop_watchers(&mut self) {
        for handle in self.watchers.drain(..) {
            handle.stop().await;
        }
    }

    fn transition(&mut self, next: SensorState) {
        if self.state.can_transition_to(next) {
            debug!(from = %self.state, to = %next, "Sensor state");
            self.state = next;
        }
    }
}
