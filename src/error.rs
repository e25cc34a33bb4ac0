use thiserror::Error;

/// Main error type for the canary mesh
#[derive(Error, Debug)]
pub enum CanaryError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Forensic vault errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Host primitive errors
    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Session lock failed: {0}")]
    Lock(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for CanaryError
pub type Result<T> = std::result::Result<T, CanaryError>;

impl CanaryError {
    /// Whether the failure came from the agent/vault channel rather than local state
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CanaryError::Http(_) | CanaryError::Timeout(_) | CanaryError::UnexpectedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(CanaryError::Timeout("heartbeat".into()).is_transport());
        assert!(CanaryError::UnexpectedResponse("bad json".into()).is_transport());
        assert!(!CanaryError::Persistence("disk full".into()).is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = CanaryError::Validation("hostname required".to_string());
        assert_eq!(err.to_string(), "Validation failed: hostname required");
    }
}
