pub mod adapters;
pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod persistence;

pub use agent::{build_sensor, Sensor, SensorConfig, VaultApi, VaultClient};
pub use config::AppConfig;
pub use coordinator::{BreachReport, CoordinationService, IngestOutcome};
pub use domain::{Command, HostStatus, LogEntry, Policy, PolicyScope, SensorState};
pub use error::{CanaryError, Result};
pub use persistence::ForensicLog;
