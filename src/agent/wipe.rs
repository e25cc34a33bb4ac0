//! Canary wipe
//!
//! Recursively removes every configured watch path unless the path text
//! contains a protected marker. The marker check is a plain case-sensitive
//! substring test, not a sandbox. One failing path never stops the others.

use std::io::ErrorKind;
use tracing::{info, warn};

/// Deny-list of substrings that keep a path from being wiped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeGuard {
    protected_markers: Vec<String>,
}

impl WipeGuard {
    pub fn new(protected_markers: Vec<String>) -> Self {
        Self { protected_markers }
    }

    /// Whether `path` may be wiped
    pub fn allows(&self, path: &str) -> bool {
        !self
            .protected_markers
            .iter()
            .any(|marker| !marker.is_empty() && path.contains(marker.as_str()))
    }
}

impl Default for WipeGuard {
    fn default() -> Self {
        Self::new(vec!["Windows".to_string()])
    }
}

/// Outcome of one wipe pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WipeReport {
    pub removed: Vec<String>,
    pub protected: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
}

/// Remove every allowed path, swallowing per-path failures
pub async fn wipe_paths(paths: &[String], guard: &WipeGuard) -> WipeReport {
    let mut report = WipeReport::default();

    for path in paths {
        if !guard.allows(path) {
            warn!(path = %path, "Refusing to wipe protected path");
            report.protected.push(path.clone());
            continue;
        }

        let result = match tokio::fs::symlink_metadata(path).await {
            Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
            Ok(_) => tokio::fs::remove_file(path).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(path = %path, "Canary path wiped");
                report.removed.push(path.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => report.missing.push(path.clone()),
            Err(e) => {
                warn!(path = %path, "Wipe failed: {}", e);
                report.failed.push(path.clone());
            }
        }
    }

    report
}
