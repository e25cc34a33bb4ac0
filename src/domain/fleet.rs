use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the last heartbeat below which a host counts as online
pub const LIVENESS_THRESHOLD_SECS: i64 = 30;

/// Last known state of one agent, keyed by hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub hostname: String,
    pub ip: String,
    pub last_seen: DateTime<Utc>,
    pub current_path: String,
}

/// Liveness derived from heartbeat age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostStatus {
    Online,
    Disconnected,
}

impl HostStatus {
    /// `elapsed < 30s` is online; exactly 30s is already disconnected
    pub fn from_elapsed_secs(elapsed_secs: i64) -> Self {
        if elapsed_secs < LIVENESS_THRESHOLD_SECS {
            HostStatus::Online
        } else {
            HostStatus::Disconnected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Online => "ONLINE",
            HostStatus::Disconnected => "DISCONNECTED",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fleet view of one host as reported by `GET /api/fleet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostView {
    pub ip: String,
    pub status: HostStatus,
    pub last_seen: String,
    pub current_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_boundary() {
        assert_eq!(HostStatus::from_elapsed_secs(0), HostStatus::Online);
        assert_eq!(HostStatus::from_elapsed_secs(29), HostStatus::Online);
        assert_eq!(HostStatus::from_elapsed_secs(30), HostStatus::Disconnected);
        assert_eq!(HostStatus::from_elapsed_secs(31), HostStatus::Disconnected);
    }

    #[test]
    fn test_status_wire_name() {
        assert_eq!(
            serde_json::to_string(&HostStatus::Disconnected).unwrap(),
            "\"DISCONNECTED\""
        );
    }
}
