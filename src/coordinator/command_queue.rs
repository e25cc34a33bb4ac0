//! Command Queue: one pending command slot per host
//!
//! Enqueue overwrites (last write wins), consume removes. Commands are
//! idempotent (a second lock or wipe is harmless), so an overwritten intent
//! is dropped rather than queued behind the newer one.

use dashmap::DashMap;
use tracing::{debug, info};

use crate::domain::Command;

#[derive(Debug, Default)]
pub struct CommandQueue {
    slots: DashMap<String, Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `command` for `hostname`, returning whatever it replaced
    pub fn enqueue(&self, hostname: &str, command: Command) -> Option<Command> {
        let replaced = self.slots.insert(hostname.to_string(), command);
        match replaced {
            Some(previous) => debug!(
                hostname = %hostname,
                previous = %previous,
                command = %command,
                "Overwrote pending command"
            ),
            None => info!(hostname = %hostname, command = %command, "Command queued"),
        }
        replaced
    }

    /// Take the pending command for `hostname`, if any
    ///
    /// The removal is atomic: of two concurrent consumers exactly one sees
    /// the command.
    pub fn consume(&self, hostname: &str) -> Option<Command> {
        self.slots.remove(hostname).map(|(_, command)| command)
    }

    /// Look at the pending command without consuming it
    pub fn peek(&self, hostname: &str) -> Option<Command> {
        self.slots.get(hostname).map(|slot| *slot)
    }

    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }
}
