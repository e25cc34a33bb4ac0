//! Vault API client
//!
//! The agent's only channel to the coordination service: heartbeat (which
//! doubles as command delivery), policy fetch and breach reporting. Every
//! call is bounded by the client timeout and never retried here.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::api::types::{AlertRequest, HeartbeatRequest, HeartbeatResponse};
use crate::domain::{Command, Policy};
use crate::error::{CanaryError, Result};

/// Coordination endpoints used by the sensor
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Report liveness; returns the command queued for this host, if any
    async fn heartbeat(&self, request: &HeartbeatRequest) -> Result<Option<Command>>;

    /// Effective policy for `hostname`
    async fn fetch_policy(&self, hostname: &str) -> Result<Policy>;

    /// Send one breach report
    async fn report_breach(&self, request: &AlertRequest) -> Result<()>;
}

/// Vault client configuration
#[derive(Debug, Clone)]
pub struct VaultClientConfig {
    /// API base URL, e.g. http://127.0.0.1:8000/api
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for VaultClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// reqwest-backed vault client
pub struct VaultClient {
    config: VaultClientConfig,
    http: Client,
}

impl VaultClient {
    pub fn new(config: VaultClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CanaryError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn parse<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CanaryError::UnexpectedResponse(format!(
                "{} returned {} - {}",
                endpoint, status, body
            )));
        }

        response.json::<T>().await.map_err(|e| {
            CanaryError::UnexpectedResponse(format!("{} sent a malformed body: {}", endpoint, e))
        })
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> CanaryError {
    if err.is_timeout() {
        CanaryError::Timeout(endpoint.to_string())
    } else {
        CanaryError::Http(err)
    }
}

#[async_trait]
impl VaultApi for VaultClient {
    async fn heartbeat(&self, request: &HeartbeatRequest) -> Result<Option<Command>> {
        let response = self
            .http
            .post(self.url("heartbeat"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("heartbeat", e))?;

        let body: HeartbeatResponse = Self::parse("heartbeat", response).await?;
        debug!(status = %body.status, command = ?body.command, "Heartbeat acknowledged");
        Ok(body.command)
    }

    async fn fetch_policy(&self, hostname: &str) -> Result<Policy> {
        let response = self
            .http
            .get(self.url(&format!("config/{}", hostname)))
            .send()
            .await
            .map_err(|e| transport_error("config", e))?;

        Self::parse("config", response).await
    }

    async fn report_breach(&self, request: &AlertRequest) -> Result<()> {
        let response = self
            .http
            .post(self.url("alert"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("alert", e))?;

        let _: serde_json::Value = Self::parse("alert", response).await?;
        Ok(())
    }
}
