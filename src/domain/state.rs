use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent control-loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorState {
    /// Process started, no cycle run yet
    Idle,
    /// Heartbeat, command execution and policy fetch in progress
    Syncing,
    /// Sleeping out the rest of the cycle while watchers run
    Monitoring,
}

impl SensorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorState::Idle => "IDLE",
            SensorState::Syncing => "SYNCING",
            SensorState::Monitoring => "MONITORING",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: SensorState) -> bool {
        use SensorState::*;

        matches!(
            (self, target),
            (Idle, Syncing) | (Syncing, Monitoring) | (Monitoring, Syncing)
        )
    }

    /// Get valid next states from current state
    pub fn valid_transitions(&self) -> Vec<SensorState> {
        use SensorState::*;

        match self {
            Idle => vec![Syncing],
            Syncing => vec![Monitoring],
            Monitoring => vec![Syncing],
        }
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SensorState {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "IDLE" => Ok(SensorState::Idle),
            "SYNCING" => Ok(SensorState::Syncing),
            "MONITORING" => Ok(SensorState::Monitoring),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}
