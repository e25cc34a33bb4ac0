//! Host primitives the sensor drives: session lock and screen capture
//!
//! Both shell out to whatever the platform provides. Capture is best effort;
//! callers degrade to "no image" when it fails.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::error::{CanaryError, Result};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostActions: Send + Sync {
    /// Lock the interactive session
    async fn lock_session(&self) -> Result<()>;

    /// Write a PNG of the current screen to `dest`
    async fn capture_screen(&self, dest: &Path) -> Result<()>;
}

/// Platform implementation backed by stock OS tools
#[derive(Debug, Default, Clone)]
pub struct OsHostActions;

impl OsHostActions {
    pub fn new() -> Self {
        Self
    }
}

async fn run_tool(program: &str, args: &[&str]) -> std::io::Result<bool> {
    debug!(program, ?args, "Running host tool");
    let status = Command::new(program).args(args).status().await?;
    Ok(status.success())
}

#[async_trait]
impl HostActions for OsHostActions {
    async fn lock_session(&self) -> Result<()> {
        let ok = if cfg!(target_os = "windows") {
            run_tool("rundll32.exe", &["user32.dll,LockWorkStation"]).await
        } else if cfg!(target_os = "macos") {
            run_tool("pmset", &["displaysleepnow"]).await
        } else {
            run_tool("loginctl", &["lock-session"]).await
        }
        .map_err(|e| CanaryError::Lock(e.to_string()))?;

        if ok {
            Ok(())
        } else {
            Err(CanaryError::Lock("lock tool exited with failure".to_string()))
        }
    }

    async fn capture_screen(&self, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CanaryError::Capture(e.to_string()))?;
        }
        let dest_str = dest.to_string_lossy();

        let ok = if cfg!(target_os = "macos") {
            run_tool("screencapture", &["-x", &dest_str]).await
        } else if cfg!(target_os = "windows") {
            return Err(CanaryError::Capture(
                "no stock screen capture tool on this platform".to_string(),
            ));
        } else {
            run_tool("import", &["-window", "root", &dest_str]).await
        }
        .map_err(|e| CanaryError::Capture(e.to_string()))?;

        if ok && dest.exists() {
            Ok(())
        } else {
            Err(CanaryError::Capture(format!(
                "capture tool produced no image at {}",
                dest.display()
            )))
        }
    }
}
