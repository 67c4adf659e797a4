//! Recurring reminder scheduler.
//!
//! Samples the local clock, evaluates the user's reminder settings once per
//! minute and hands fired reminders to the notification dispatcher.

pub mod clock;
pub mod messages;
pub mod runner;
pub mod triggers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runner::{ReminderScheduler, SchedulerEvent, SchedulerState, SchedulerStatus, TickOutcome};
pub use triggers::{FiredTriggerSet, TriggerCategory, evaluate};
