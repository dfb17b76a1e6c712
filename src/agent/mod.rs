//! Delegate agent client
//!
//! An optional external agent service may answer mesh requests instead
//! of the local engines. The call is a single best-effort attempt: any
//! failure is reported as an error and the caller falls back locally.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::MeshConfig;
use crate::error::MeshError;
use crate::Result;

/// Path the full `{type, payload}` request is forwarded to
pub const MESSAGE_PATH: &str = "/api/v1/message:send";

/// Trait for the remote side of the mesh
#[async_trait]
pub trait AgentClient: Send + Sync {
    fn name(&self) -> &str;

    /// Forward a raw request; return the raw JSON answer on a 2xx.
    async fn send(&self, request: &Value) -> Result<Value>;
}

/// Reusable HTTP agent client (connection-pooled)
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client when `MESH_AGENT_URL` is configured.
    pub fn from_config(config: &MeshConfig) -> Result<Option<Self>> {
        config
            .agent_url
            .as_deref()
            .map(|url| Self::new(url, config.agent_timeout))
            .transpose()
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, MESSAGE_PATH)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &Value) -> Result<Value> {
        let url = self.endpoint();
        debug!(url = %url, "Forwarding request to agent");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Agent request failed: {}", e);
                MeshError::AgentError(format!("request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeshError::AgentError(format!(
                "agent returned {}: {}",
                status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| MeshError::AgentError(format!("invalid JSON from agent: {}", e)))
    }
}
