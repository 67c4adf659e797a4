//! Host platform seams for notifications.
//!
//! Capabilities are discovered once when the subsystem starts and handed to
//! the components as a [`Capability`], so no component re-runs feature
//! detection on every call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod stub;

pub use stub::LogNotificationPlatform;

/// Result of probing the host for an optional capability.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    /// The capability exists; `T` is the handle used to drive it.
    Supported(T),
    /// The host lacks the capability entirely.
    Unsupported,
}

impl<T> Capability<T> {
    /// Returns `true` when the capability is present.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

/// Notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The user allowed notifications.
    Granted,
    /// The user blocked notifications.
    Denied,
    /// The user has not decided yet.
    Default,
}

impl PermissionState {
    /// Returns `true` only for [`PermissionState::Granted`].
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Dedup tag: a new notification with the same tag replaces the old one.
    pub tag: String,
    /// Keep the notification on screen until the user dismisses it.
    pub require_interaction: bool,
}

/// Host notification surface.
///
/// Two display paths exist: the durable path backed by a service worker
/// (survives the page losing focus) and the direct page-scoped path.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Current permission. Never prompts the user.
    fn permission(&self) -> PermissionState;

    /// Show through the durable channel. Fails when the channel is not available.
    async fn show_durable(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Show immediately, scoped to the current page.
    fn show_direct(&self, notification: &Notification) -> anyhow::Result<()>;
}
