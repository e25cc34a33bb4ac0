use serde::{Deserialize, Serialize};

use crate::domain::{parse_csv, Command, LogEntry, Policy, PolicyScope};
use crate::error::{CanaryError, Result};

// ============================================================================
// Generic Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn ok(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
}

// ============================================================================
// Alert / Forensic Log Types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertRequest {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteLogRequest {
    pub time: String,
    pub file: String,
}

// ============================================================================
// Policy Types
// ============================================================================

/// Policy update as sent by the dashboard
///
/// Every field the caller leaves out resets to its empty value in the stored
/// policy; nothing is carried over from the previous policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyUpdateRequest {
    /// Comma-separated watch directories
    #[serde(default)]
    pub watch_path: String,
    /// Comma-separated watch files
    #[serde(default)]
    pub watch_files: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub auto_lock: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub hostname: Option<String>,
}

impl PolicyUpdateRequest {
    pub fn to_policy(&self) -> Policy {
        Policy {
            watch_paths: parse_csv(&self.watch_path),
            watch_files: parse_csv(&self.watch_files),
            extensions: self.extensions.clone(),
            auto_lock: self.auto_lock,
        }
    }

    pub fn scope(&self) -> Result<PolicyScope> {
        if self.is_global {
            return Ok(PolicyScope::Global);
        }
        match self.hostname.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => Ok(PolicyScope::Host(host.to_string())),
            _ => Err(CanaryError::Validation(
                "hostname is required for a per-host policy".to_string(),
            )),
        }
    }
}

// ============================================================================
// Fleet Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub hostname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default = "default_current_path")]
    pub current_path: String,
}

fn default_current_path() -> String {
    "IDLE".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatResponse {
    pub status: String,
    pub command: Option<Command>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_update_resets_omitted_fields() {
        let req: PolicyUpdateRequest = serde_json::from_str(
            r#"{"hostname":"ws-01","watch_path":" D:\\Bait , ","extensions":[".txt"]}"#,
        )
        .unwrap();
        let policy = req.to_policy();

        assert_eq!(policy.watch_paths, vec!["D:\\Bait"]);
        assert!(policy.watch_files.is_empty());
        assert!(!policy.auto_lock);
        assert_eq!(req.scope().unwrap(), PolicyScope::Host("ws-01".into()));
    }

    #[test]
    fn test_extensions_taken_literally() {
        let req: PolicyUpdateRequest =
            serde_json::from_str(r#"{"is_global":true,"extensions":[" .TXT",""]}"#).unwrap();
        assert_eq!(req.to_policy().extensions, vec![" .TXT", ""]);
        assert_eq!(req.scope().unwrap(), PolicyScope::Global);
    }

    #[test]
    fn test_host_scope_requires_hostname() {
        let req = PolicyUpdateRequest::default();
        assert!(matches!(req.scope(), Err(CanaryError::Validation(_))));
    }

    #[test]
    fn test_heartbeat_defaults() {
        let req: HeartbeatRequest = serde_json::from_str(r#"{"hostname":"ws-01"}"#).unwrap();
        assert_eq!(req.current_path, "IDLE");
        assert_eq!(req.ip, "");
    }

    #[test]
    fn test_heartbeat_response_wire_format() {
        let resp = HeartbeatResponse {
            status: "ok".into(),
            command: Some(Command::LockWorkstation),
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({"status": "ok", "command": "LOCK_WORKSTATION"})
        );
    }
}
