//! Persistence Layer for Forensic Evidence
//!
//! The forensic log is the only durable state of the coordination service;
//! fleet, command and policy state live in memory.

pub mod forensic_log;

pub use forensic_log::ForensicLog;
