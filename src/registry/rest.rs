//! Token registry backed by the BaaS REST endpoint.
//!
//! Rows are written with a PostgREST-style upsert:
//!
//! ```text
//! POST {base_url}/rest/v1/{table}?on_conflict=token
//! Prefer: resolution=merge-duplicates,return=minimal
//! [{"owner_id": ..., "token": ..., "platform": "web", "last_active_at": ...}]
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{TokenRecord, TokenRegistry};
use crate::config::RegistryConfig;
use crate::error::{ReminderError, Result};

/// Column the registry resolves conflicts on.
const CONFLICT_COLUMN: &str = "token";

/// Remote registry client.
#[derive(Debug, Clone)]
pub struct RestTokenRegistry {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestTokenRegistry {
    /// Create a client for `base_url`, writing into `table`.
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(ReminderError::Config(
                "registry base_url must not be empty".to_owned(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{base}/rest/v1/{table}"),
            api_key: api_key.into(),
        })
    }

    /// Build from the `[registry]` config section.
    ///
    /// # Errors
    ///
    /// Fails when the base URL is empty, no API key can be resolved, or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ReminderError::Config(format!(
                "registry API key missing (set registry.api_key or ${})",
                config.api_key_env
            ))
        })?;
        Self::new(
            &config.base_url,
            &config.table,
            api_key,
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    /// Full upsert endpoint, without the query string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenRegistry for RestTokenRegistry {
    async fn upsert(&self, record: &TokenRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("on_conflict", CONFLICT_COLUMN)])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| ReminderError::Registry(format!("upsert request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReminderError::Registry(format!(
                "upsert rejected with {status}: {body}"
            )));
        }

        debug!(owner_id = %record.owner_id, "push token upserted");
        Ok(())
    }
}
