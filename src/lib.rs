//! FitMind reminders: recurring local notifications and push-token registration.
//!
//! # Architecture
//!
//! - **Config**: the user's reminder settings, read from the profile
//! - **Scheduler**: samples the clock, evaluates each minute once, dispatches
//! - **Notify**: shows reminders via the durable channel, with direct fallback
//! - **Push**: one-shot permission → token → registry upsert per session
//! - **Registry**: the remote push-token table (in-memory or REST)
//!
//! Host capabilities (notifications, push) are probed once and passed in as
//! [`platform::Capability`] values.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod notify;
pub mod platform;
pub mod profile;
pub mod push;
pub mod registry;
pub mod scheduler;

pub use config::{AppConfig, ClockTime, ReminderConfiguration};
pub use error::{FailureKind, ReminderError, Result};
pub use notify::{DeliveryOutcome, NotificationDispatcher};
pub use profile::{ProfileSnapshot, ProfileStore};
pub use push::{PushProvider, PushRegistration, RegistrationOutcome};
pub use registry::{TokenRecord, TokenRegistry};
pub use scheduler::{ReminderScheduler, SchedulerEvent, TriggerCategory};
