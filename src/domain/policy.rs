use serde::{Deserialize, Serialize};
use std::path::Path;

/// Monitoring configuration for one host, or the fleet-wide default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Directories watched for modifications, in the order given
    #[serde(default)]
    pub watch_paths: Vec<String>,
    /// Individual canary files, in the order given
    #[serde(default)]
    pub watch_files: Vec<String>,
    /// Extensions that count as a breach (e.g. ".txt"), matched case-insensitively
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Queue a workstation lock whenever this host reports a breach
    #[serde(default)]
    pub auto_lock: bool,
}

impl Policy {
    /// Whether a modified path carries one of the configured extensions
    pub fn matches_extension(&self, path: &Path) -> bool {
        extension_matches(path, &self.extensions)
    }

    /// Whether an agent applying `applied_paths`/`applied_exts` must rebuild its watchers
    ///
    /// Plain structural comparison: a reordering counts as a change.
    pub fn differs_from(&self, applied_paths: &[String], applied_exts: &[String]) -> bool {
        self.watch_paths.as_slice() != applied_paths || self.extensions.as_slice() != applied_exts
    }
}

/// Which policy an update replaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyScope {
    Global,
    Host(String),
}

/// Split comma-separated text into trimmed, non-empty entries, order preserved
pub fn parse_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compare the extension of `path` (with its leading dot) against `extensions`
pub fn extension_matches(path: &Path, extensions: &[String]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => format!(".{}", e),
        None => return false,
    };
    extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(&ext))
}
