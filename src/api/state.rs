use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::coordinator::CoordinationService;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Fleet, command, policy and forensic state
    pub service: Arc<CoordinationService>,

    /// Directory served under /static/screenshots
    pub screenshots_dir: Arc<PathBuf>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<CoordinationService>, screenshots_dir: PathBuf) -> Self {
        Self {
            service,
            screenshots_dir: Arc::new(screenshots_dir),
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
