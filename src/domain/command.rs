use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative action delivered to an agent on its next heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Lock the interactive session on the host
    LockWorkstation,
    /// Recursively remove every configured canary path
    WipeCanaries,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::LockWorkstation => "LOCK_WORKSTATION",
            Command::WipeCanaries => "WIPE_CANARIES",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&Command::LockWorkstation).unwrap(),
            "\"LOCK_WORKSTATION\""
        );
        let parsed: Command = serde_json::from_str("\"WIPE_CANARIES\"").unwrap();
        assert_eq!(parsed, Command::WipeCanaries);
    }

    #[test]
    fn test_absent_command_is_null() {
        let none: Option<Command> = None;
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
    }
}
