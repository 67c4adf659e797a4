//! Reminder delivery.
//!
//! [`NotificationDispatcher`] shows one notification per fired trigger. It
//! prefers the durable service-worker channel and falls back to a direct
//! page-scoped notification. Every failure is absorbed here; callers only
//! see a [`DeliveryOutcome`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::platform::{Capability, Notification, NotificationPlatform};

/// Why a delivery was skipped without touching the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The host has no notification capability.
    Unsupported,
    /// Permission is not granted.
    PermissionNotGranted,
}

/// What happened to a single delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Shown through the durable channel.
    Durable,
    /// Shown through the direct fallback.
    Direct,
    /// Not attempted.
    Skipped(SkipReason),
    /// Both paths failed; the occurrence is lost.
    Failed(String),
}

/// Shows reminder notifications on the host platform.
#[derive(Clone)]
pub struct NotificationDispatcher {
    platform: Capability<Arc<dyn NotificationPlatform>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a probed platform capability.
    pub fn new(platform: Capability<Arc<dyn NotificationPlatform>>) -> Self {
        if !platform.is_supported() {
            info!("notifications are not supported on this host; reminders will not be shown");
        }
        Self { platform }
    }

    /// Show `title`/`body` with the dedup `tag`.
    ///
    /// Never requests permission and never returns an error.
    pub async fn deliver(&self, title: &str, body: &str, tag: &str) -> DeliveryOutcome {
        let Capability::Supported(platform) = &self.platform else {
            return DeliveryOutcome::Skipped(SkipReason::Unsupported);
        };

        if !platform.permission().is_granted() {
            debug!(tag, "notification permission not granted, skipping delivery");
            return DeliveryOutcome::Skipped(SkipReason::PermissionNotGranted);
        }

        let notification = Notification {
            title: title.to_owned(),
            body: body.to_owned(),
            tag: tag.to_owned(),
            require_interaction: true,
        };

        match platform.show_durable(&notification).await {
            Ok(()) => return DeliveryOutcome::Durable,
            Err(e) => {
                debug!(tag, "durable notification channel failed, falling back: {e}");
            }
        }

        match platform.show_direct(&notification) {
            Ok(()) => DeliveryOutcome::Direct,
            Err(e) => {
                warn!(tag, "notification delivery failed: {e}");
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::platform::PermissionState;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlatform {
        permission: Option<PermissionState>,
        durable_fails: bool,
        direct_fails: bool,
        durable: Mutex<Vec<Notification>>,
        direct: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationPlatform for RecordingPlatform {
        fn permission(&self) -> PermissionState {
            self.permission.unwrap_or(PermissionState::Granted)
        }

        async fn show_durable(&self, notification: &Notification) -> anyhow::Result<()> {
            if self.durable_fails {
                anyhow::bail!("service worker registration missing");
            }
            self.durable.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn show_direct(&self, notification: &Notification) -> anyhow::Result<()> {
            if self.direct_fails {
                anyhow::bail!("Notification constructor threw");
            }
            self.direct.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn dispatcher(platform: &Arc<RecordingPlatform>) -> NotificationDispatcher {
        let dyn_platform: Arc<dyn NotificationPlatform> = platform.clone();
        NotificationDispatcher::new(Capability::Supported(dyn_platform))
    }

    #[tokio::test]
    async fn unsupported_platform_is_noop() {
        let d = NotificationDispatcher::new(Capability::Unsupported);
        assert_eq!(
            d.deliver("t", "b", "tag").await,
            DeliveryOutcome::Skipped(SkipReason::Unsupported)
        );
    }

    #[tokio::test]
    async fn ungranted_permission_is_noop() {
        for state in [PermissionState::Denied, PermissionState::Default] {
            let platform = Arc::new(RecordingPlatform {
                permission: Some(state),
                ..Default::default()
            });
            let outcome = dispatcher(&platform).deliver("t", "b", "tag").await;
            assert_eq!(
                outcome,
                DeliveryOutcome::Skipped(SkipReason::PermissionNotGranted)
            );
            assert!(platform.durable.lock().unwrap().is_empty());
            assert!(platform.direct.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn durable_path_is_preferred_and_sticky() {
        let platform = Arc::new(RecordingPlatform::default());
        let outcome = dispatcher(&platform)
            .deliver("FitMind: Almoço", "Hora do almoço!", "meal-lunch")
            .await;

        assert_eq!(outcome, DeliveryOutcome::Durable);
        let shown = platform.durable.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].tag, "meal-lunch");
        assert!(shown[0].require_interaction);
        assert!(platform.direct.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn durable_failure_falls_back_to_direct_with_same_content() {
        let platform = Arc::new(RecordingPlatform {
            durable_fails: true,
            ..Default::default()
        });
        let outcome = dispatcher(&platform)
            .deliver("FitMind: Jantar", "Hora do jantar", "meal-dinner")
            .await;

        assert_eq!(outcome, DeliveryOutcome::Direct);
        let shown = platform.direct.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "FitMind: Jantar");
        assert_eq!(shown[0].body, "Hora do jantar");
        assert_eq!(shown[0].tag, "meal-dinner");
    }

    #[tokio::test]
    async fn both_paths_failing_is_reported_not_raised() {
        let platform = Arc::new(RecordingPlatform {
            durable_fails: true,
            direct_fails: true,
            ..Default::default()
        });
        let outcome = dispatcher(&platform).deliver("t", "b", "tag").await;
        assert!(matches!(outcome, DeliveryOutcome::Failed(ref msg) if msg.contains("threw")));
    }
}
