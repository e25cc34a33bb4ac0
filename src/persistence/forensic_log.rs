//! Forensic Log
//!
//! Append-only breach evidence stored as newline-delimited JSON:
//! - Arrival order in the file is the canonical order
//! - Unparseable lines are skipped on read, never fatal
//! - Point-delete and purge rewrite the whole file
//!
//! Every file operation runs under one async mutex, so a rewrite can never
//! race an append and drop it.

use crate::domain::LogEntry;
use crate::error::{CanaryError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Durable NDJSON store for breach records
pub struct ForensicLog {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl ForensicLog {
    /// Create a log backed by `path` (the file is created lazily on first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    /// Create a log and make sure its parent directory exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let log = Self::new(path);
        if let Some(parent) = log.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                CanaryError::Persistence(format!(
                    "failed to create vault dir {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush it to disk before returning
    pub async fn append(&self, entry: &LogEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.io_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.persistence_error("open", e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.persistence_error("append to", e))?;
        file.sync_data()
            .await
            .map_err(|e| self.persistence_error("sync", e))?;

        debug!(hostname = %entry.hostname, file = %entry.file, "Appended forensic record");
        Ok(())
    }

    /// All parseable records, most recent first
    pub async fn list(&self) -> Result<Vec<LogEntry>> {
        let _guard = self.io_lock.lock().await;
        let Some(raw) = self.read_raw().await? else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<LogEntry> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping malformed forensic record: {}", e);
                    None
                }
            })
            .collect();
        entries.reverse();
        Ok(entries)
    }

    /// Drop every record whose `(time, file)` equals the given pair
    ///
    /// Returns how many records were removed. `time` carries no date, so
    /// unrelated breaches of the same file at the same wall-clock second are
    /// removed together. Unparseable lines are kept as they are.
    pub async fn delete_matching(&self, time: &str, file: &str) -> Result<usize> {
        let _guard = self.io_lock.lock().await;
        let Some(raw) = self.read_raw().await? else {
            return Ok(0);
        };

        let mut removed = 0usize;
        let mut kept = String::with_capacity(raw.len());
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            let matches = serde_json::from_str::<LogEntry>(line)
                .map(|entry| entry.matches_key(time, file))
                .unwrap_or(false);
            if matches {
                removed += 1;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }

        if removed > 0 {
            self.rewrite(kept.as_bytes()).await?;
        }
        if removed > 1 {
            warn!(
                time = %time,
                file = %file,
                removed,
                "Point-delete matched more than one forensic record"
            );
        }
        Ok(removed)
    }

    /// Truncate the store to empty
    pub async fn purge(&self) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        fs::write(&self.path, b"")
            .await
            .map_err(|e| self.persistence_error("truncate", e))?;
        info!(path = %self.path.display(), "Forensic log purged");
        Ok(())
    }

    async fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.persistence_error("read", e)),
        }
    }

    async fn rewrite(&self, contents: &[u8]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents)
            .await
            .map_err(|e| self.persistence_error("write temp copy of", e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.persistence_error("replace", e))
    }

    fn persistence_error(&self, op: &str, err: std::io::Error) -> CanaryError {
        CanaryError::Persistence(format!(
            "failed to {} forensic log {}: {}",
            op,
            self.path.display(),
            err
        ))
    }
}
