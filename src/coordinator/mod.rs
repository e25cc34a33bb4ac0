//! Fleet Coordination
//!
//! In-memory fleet, command and policy state plus the service that ties them
//! to the forensic log. Each component carries its own lock; the service
//! holds no lock of its own.

pub mod command_queue;
pub mod fleet_registry;
pub mod policy_store;
pub mod service;

pub use command_queue::CommandQueue;
pub use fleet_registry::FleetRegistry;
pub use policy_store::PolicyStore;
pub use service::{BreachReport, CoordinationService, IngestOutcome};
