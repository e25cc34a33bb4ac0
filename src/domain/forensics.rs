use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Action label recorded for every ingested breach
pub const BREACH_ACTION: &str = "CRITICAL BREACH";

/// Wall-clock format of `LogEntry::time` (no date component)
pub const LOG_TIME_FORMAT: &str = "%H:%M:%S";

/// One forensic record, stored as a single NDJSON line
///
/// `time` has second granularity and no date, so it is not unique: two
/// breaches of the same file a day apart share the same `(time, file)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub hostname: String,
    pub file: String,
    pub action: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl LogEntry {
    /// Build a breach record stamped with `at`
    pub fn breach<Tz: TimeZone>(
        at: &DateTime<Tz>,
        hostname: impl Into<String>,
        file: impl Into<String>,
        image: Option<String>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            time: at.format(LOG_TIME_FORMAT).to_string(),
            hostname: hostname.into(),
            file: file.into(),
            action: BREACH_ACTION.to_string(),
            image,
        }
    }

    /// Breach record stamped with the local wall clock
    pub fn breach_now(
        hostname: impl Into<String>,
        file: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Self::breach(&Local::now(), hostname, file, image)
    }

    /// Whether this record is addressed by the visible `(time, file)` pair
    pub fn matches_key(&self, time: &str, file: &str) -> bool {
        self.time == time && self.file == file
    }
}

/// Screenshot file name for a breach captured at `epoch_secs` on `hostname`
pub fn snapshot_file_name(epoch_secs: i64, hostname: &str) -> String {
    format!("snap_{}_{}.png", epoch_secs, hostname)
}

/// Normalize an incoming image reference: blank and the literal "None" mean absent
pub fn normalize_image_ref(image: Option<String>) -> Option<String> {
    image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "None")
}
