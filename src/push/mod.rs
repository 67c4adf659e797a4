//! Push-token registration.
//!
//! Runs at most once per session when reminders are enabled: ask for
//! permission, obtain a messaging handle, wait for the durable channel,
//! fetch a push token and upsert it to the token registry.
//!
//! Every step is safe to repeat, so a failed run is simply retried the next
//! time the flow is started. There is no backoff.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{FailureKind, ReminderError, Result};
use crate::platform::{Capability, PermissionState};
use crate::registry::{TokenRecord, TokenRegistry};

/// Opaque handle to the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingHandle(pub String);

/// A ready durable delivery channel (service worker registration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRegistration {
    /// Scope the channel is registered for.
    pub scope: String,
}

/// Push messaging provider.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Ask the user for notification permission. Returns the stored decision
    /// without prompting when one exists.
    async fn request_permission(&self) -> anyhow::Result<PermissionState>;

    /// Obtain a messaging handle, or `None` when push is unsupported here.
    async fn messaging_handle(&self) -> anyhow::Result<Option<MessagingHandle>>;

    /// Resolve once the durable delivery channel is active.
    async fn wait_channel_ready(&self) -> anyhow::Result<ChannelRegistration>;

    /// Request a push token scoped to `channel`.
    async fn token(
        &self,
        handle: &MessagingHandle,
        channel: &ChannelRegistration,
    ) -> anyhow::Result<Option<String>>;
}

/// Result of one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A token was already stored this session; nothing was done.
    AlreadyRegistered,
    /// The host has no push provider, or the provider reports push unsupported.
    Unsupported,
    /// Permission was not granted.
    PermissionDenied,
    /// The provider returned no token.
    NoToken,
    /// The token was upserted.
    Registered {
        /// Token written to the registry.
        token: String,
    },
    /// A provider or registry step failed; retry by running the flow again.
    Failed(String),
}

/// Registration flow and its session state.
pub struct PushRegistration {
    provider: Capability<Arc<dyn PushProvider>>,
    registry: Arc<dyn TokenRegistry>,
    token_sent: bool,
}

impl PushRegistration {
    /// Create the flow over a probed provider capability.
    pub fn new(
        provider: Capability<Arc<dyn PushProvider>>,
        registry: Arc<dyn TokenRegistry>,
    ) -> Self {
        if !provider.is_supported() {
            info!("push messaging is not supported on this host; token registration disabled");
        }
        Self {
            provider,
            registry,
            token_sent: false,
        }
    }

    /// Whether a token has been upserted this session.
    pub fn token_sent(&self) -> bool {
        self.token_sent
    }

    /// Run the flow for `owner_id`. Never returns an error; failures are
    /// logged and reported as [`RegistrationOutcome::Failed`].
    pub async fn register(&mut self, owner_id: &str) -> RegistrationOutcome {
        if self.token_sent {
            return RegistrationOutcome::AlreadyRegistered;
        }

        match self.try_register(owner_id).await {
            Ok(outcome) => {
                if matches!(outcome, RegistrationOutcome::Registered { .. }) {
                    self.token_sent = true;
                }
                outcome
            }
            Err(e) => match e.kind() {
                FailureKind::CapabilityAbsent => {
                    debug!("push registration skipped: {e}");
                    RegistrationOutcome::Unsupported
                }
                FailureKind::PermissionDenied => {
                    debug!("push registration skipped: {e}");
                    RegistrationOutcome::PermissionDenied
                }
                FailureKind::Transient => {
                    warn!("push registration failed, will retry on next start: {e}");
                    RegistrationOutcome::Failed(e.to_string())
                }
            },
        }
    }

    async fn try_register(&self, owner_id: &str) -> Result<RegistrationOutcome> {
        let Capability::Supported(provider) = &self.provider else {
            return Err(ReminderError::Unsupported("no push provider".to_owned()));
        };

        let permission = provider
            .request_permission()
            .await
            .map_err(|e| ReminderError::Push(format!("permission request failed: {e}")))?;
        if !permission.is_granted() {
            return Err(ReminderError::Permission(format!(
                "notification permission is {permission:?}"
            )));
        }

        let handle = provider
            .messaging_handle()
            .await
            .map_err(|e| ReminderError::Push(format!("messaging handle failed: {e}")))?
            .ok_or_else(|| ReminderError::Unsupported("push messaging".to_owned()))?;

        // The token must be scoped to an active channel.
        let channel = provider
            .wait_channel_ready()
            .await
            .map_err(|e| ReminderError::Push(format!("delivery channel not ready: {e}")))?;

        let Some(token) = provider
            .token(&handle, &channel)
            .await
            .map_err(|e| ReminderError::Push(format!("token request failed: {e}")))?
        else {
            debug!("push provider returned no token");
            return Ok(RegistrationOutcome::NoToken);
        };

        let record = TokenRecord::web(owner_id, token.clone(), Utc::now());
        self.registry.upsert(&record).await?;
        info!(owner_id, scope = %channel.scope, "push token registered");

        Ok(RegistrationOutcome::Registered { token })
    }
}
