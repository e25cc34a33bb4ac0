//! Policy Store: global default policy plus per-host overrides
//!
//! Updates replace the whole target policy; nothing is merged field by field.
//! Resolution hands out clones, so callers never alias stored state.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Policy, PolicyScope};

#[derive(Debug)]
pub struct PolicyStore {
    global: RwLock<Policy>,
    overrides: RwLock<HashMap<String, Policy>>,
}

impl PolicyStore {
    pub fn new(global: Policy) -> Self {
        Self {
            global: RwLock::new(global),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Effective policy for `hostname`: its override, else the global default
    pub async fn resolve(&self, hostname: &str) -> Policy {
        if let Some(policy) = self.overrides.read().await.get(hostname) {
            return policy.clone();
        }
        self.global.read().await.clone()
    }

    pub async fn global(&self) -> Policy {
        self.global.read().await.clone()
    }

    pub async fn update_global(&self, policy: Policy) {
        *self.global.write().await = policy;
        info!("Global policy replaced");
    }

    pub async fn update_override(&self, hostname: &str, policy: Policy) {
        self.overrides
            .write()
            .await
            .insert(hostname.to_string(), policy);
        info!(hostname = %hostname, "Host policy override replaced");
    }

    pub async fn apply(&self, scope: PolicyScope, policy: Policy) {
        match scope {
            PolicyScope::Global => self.update_global(policy).await,
            PolicyScope::Host(hostname) => self.update_override(&hostname, policy).await,
        }
    }

    pub async fn override_count(&self) -> usize {
        self.overrides.read().await.len()
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}
