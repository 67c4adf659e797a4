//! Headless notification platform that writes notifications to the log.

use async_trait::async_trait;
use tracing::info;

use super::{Notification, NotificationPlatform, PermissionState};

/// Notification platform for hosts without a display.
///
/// Permission is always granted and both paths log the notification. The
/// durable path is only available when constructed with [`Self::with_durable_channel`].
#[derive(Debug, Clone, Default)]
pub struct LogNotificationPlatform {
    durable: bool,
}

impl LogNotificationPlatform {
    /// Create a platform with only the direct path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the durable path.
    pub fn with_durable_channel(mut self) -> Self {
        self.durable = true;
        self
    }
}

#[async_trait]
impl NotificationPlatform for LogNotificationPlatform {
    fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn show_durable(&self, notification: &Notification) -> anyhow::Result<()> {
        if !self.durable {
            anyhow::bail!("durable notification channel not registered");
        }
        info!(
            tag = %notification.tag,
            sticky = notification.require_interaction,
            "[notification] {}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }

    fn show_direct(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            tag = %notification.tag,
            "[notification] {}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}
