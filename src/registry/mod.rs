//! Remote push-token registry.
//!
//! The registry holds one row per push token. Writes are upserts keyed on the
//! token value, so repeating a registration refreshes the row instead of
//! adding a new one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RegistryConfig;
use crate::error::Result;

mod memory;
mod rest;

pub use memory::InMemoryTokenRegistry;
pub use rest::RestTokenRegistry;

/// Platform label written for browser push tokens.
pub const WEB_PLATFORM: &str = "web";

/// One registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Profile that owns the device.
    pub owner_id: String,
    /// Push token issued by the messaging provider. Unique key.
    pub token: String,
    /// Token platform, always [`WEB_PLATFORM`] for this client.
    pub platform: String,
    /// Last time the token was seen active.
    pub last_active_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Build a web-platform record stamped at `now`.
    pub fn web(owner_id: impl Into<String>, token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            owner_id: owner_id.into(),
            token: token.into(),
            platform: WEB_PLATFORM.to_owned(),
            last_active_at: now,
        }
    }
}

/// Token registry contract.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Insert `record`, or update owner and `last_active_at` of the row with
    /// the same token.
    async fn upsert(&self, record: &TokenRecord) -> Result<()>;
}

/// Pick the registry for this host.
///
/// Without push support no token is ever produced, so the remote registry is
/// not built and its settings are not validated.
///
/// # Errors
///
/// Fails when push is supported and the `[registry]` section names a remote
/// registry that cannot be configured.
pub fn select_registry(
    config: &RegistryConfig,
    push_supported: bool,
) -> Result<Arc<dyn TokenRegistry>> {
    if !push_supported {
        if !config.base_url.is_empty() {
            info!("push messaging unavailable, remote token registry not used");
        }
        return Ok(Arc::new(InMemoryTokenRegistry::new()));
    }
    if config.base_url.is_empty() {
        return Ok(Arc::new(InMemoryTokenRegistry::new()));
    }
    Ok(Arc::new(RestTokenRegistry::from_config(config)?))
}
