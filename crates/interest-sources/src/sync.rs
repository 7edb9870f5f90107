//! Follow-graph sync trigger.
//!
//! Asks the external sync service to refresh a user's follow
//! relationships before their bios are read.

use std::time::Duration;

use async_trait::async_trait;
use interest_types::SyncConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::SourceError;

/// Refreshes follow-graph data for a user.
#[async_trait]
pub trait SyncTrigger: Send + Sync {
    async fn sync_followings(&self, user_id: &str) -> Result<(), SourceError>;
}

/// Sync trigger that does nothing, for offline snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSync;

#[async_trait]
impl SyncTrigger for NoopSync {
    async fn sync_followings(&self, user_id: &str) -> Result<(), SourceError> {
        debug!(user = user_id, "Sync disabled, skipping");
        Ok(())
    }
}

/// Configuration for the HTTP sync client.
#[derive(Debug, Clone)]
pub struct HttpSyncConfig {
    /// Service base URL (e.g., "http://localhost:4000")
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Optional bearer token
    pub api_token: Option<SecretString>,
}

impl HttpSyncConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            api_token: None,
        }
    }
}

impl From<&SyncConfig> for HttpSyncConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            api_token: config.api_token.clone().map(SecretString::from),
        }
    }
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    #[serde(rename = "userName")]
    user_name: &'a str,
}

/// Sync trigger calling `POST {base_url}/api/sync`.
///
/// A single attempt per call; failures are returned to the caller.
pub struct HttpSyncClient {
    client: Client,
    config: HttpSyncConfig,
}

impl HttpSyncClient {
    pub fn new(config: HttpSyncConfig) -> Result<Self, SourceError> {
        if config.base_url.trim().is_empty() {
            return Err(SourceError::Config("base_url must not be empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn sync_url(&self) -> String {
        format!("{}/api/sync", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SyncTrigger for HttpSyncClient {
    async fn sync_followings(&self, user_id: &str) -> Result<(), SourceError> {
        let url = self.sync_url();
        debug!(user = user_id, url = %url, "Requesting follow-graph sync");

        let mut request = self
            .client
            .post(&url)
            .json(&SyncRequest { user_name: user_id });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(user = user_id, status, "Sync request failed");
            return Err(SourceError::Status { status, body });
        }

        let body = response.bytes().await?;
        debug!(user = user_id, bytes = body.len(), "Sync completed");
        Ok(())
    }
}
