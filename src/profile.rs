//! Reactive view of the signed-in profile's reminder settings.
//!
//! The profile store publishes a [`ProfileSnapshot`] whenever the profile is
//! loaded or edited, and `None` when the session ends. The scheduler
//! subscribes and re-evaluates its Idle/Active state on every change.

use tokio::sync::watch;
use tracing::debug;

use crate::config::ReminderConfiguration;

/// The parts of the profile the scheduler reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    /// Profile identity, written as `owner_id` in the token registry.
    pub owner_id: String,
    /// Reminder settings.
    pub reminders: ReminderConfiguration,
}

/// Publisher side of the profile feed.
///
/// Dropping the store closes the feed, which stops any subscribed scheduler.
#[derive(Debug)]
pub struct ProfileStore {
    tx: watch::Sender<Option<ProfileSnapshot>>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore {
    /// Create a store with no profile loaded.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Subscribe to profile changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<ProfileSnapshot>> {
        self.tx.subscribe()
    }

    /// Publish a loaded or edited profile.
    pub fn publish(&self, snapshot: ProfileSnapshot) {
        debug!(owner_id = %snapshot.owner_id, enabled = snapshot.reminders.enabled, "profile published");
        self.tx.send_replace(Some(snapshot));
    }

    /// Mark the profile unavailable (sign-out).
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}
