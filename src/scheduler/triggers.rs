//! Trigger evaluation.
//!
//! [`evaluate`] maps one local minute, the weekday and the user's reminder
//! settings to the set of reminder categories that fire in that minute. It is
//! pure: no clock reads, no I/O, no randomness.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::config::{ApplicationFrequency, ClockTime, ReminderConfiguration};

/// Hours (inclusive) during which hydration reminders may fire.
pub const HYDRATION_WINDOW: RangeInclusive<u8> = 8..=22;

/// A reminder kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
    Checkin,
    Medication,
    Hydration,
}

impl TriggerCategory {
    /// Every category, in firing order.
    pub const ALL: [Self; 7] = [
        Self::Breakfast,
        Self::Lunch,
        Self::Snack,
        Self::Dinner,
        Self::Checkin,
        Self::Medication,
        Self::Hydration,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snack => "snack",
            Self::Dinner => "dinner",
            Self::Checkin => "checkin",
            Self::Medication => "medication",
            Self::Hydration => "hydration",
        }
    }
}

impl fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories that fired in one minute.
pub type FiredTriggerSet = BTreeSet<TriggerCategory>;

/// Evaluate which reminders fire at `now` on `weekday`.
pub fn evaluate(now: ClockTime, weekday: Weekday, config: &ReminderConfiguration) -> FiredTriggerSet {
    let mut fired = FiredTriggerSet::new();
    let meals = &config.meal_times;

    for (category, slot) in [
        (TriggerCategory::Breakfast, meals.breakfast),
        (TriggerCategory::Lunch, meals.lunch),
        (TriggerCategory::Snack, meals.snack),
        (TriggerCategory::Dinner, meals.dinner),
        (TriggerCategory::Checkin, meals.checkin),
    ] {
        if slot == Some(now) {
            fired.insert(category);
        }
    }

    if medication_due(now, weekday, config) {
        fired.insert(TriggerCategory::Medication);
    }

    if hydration_due(now, config.hydration_interval_hours) {
        fired.insert(TriggerCategory::Hydration);
    }

    fired
}

/// Medication fires at its time every day for daily cadence, otherwise only
/// on the configured weekday.
///
/// Biweekly and monthly cadences are not tracked across weeks: they fire on
/// every matching weekday, same as weekly.
fn medication_due(now: ClockTime, weekday: Weekday, config: &ReminderConfiguration) -> bool {
    if config.medication_time != Some(now) {
        return false;
    }
    match config.application_frequency {
        ApplicationFrequency::Daily => true,
        ApplicationFrequency::Weekly
        | ApplicationFrequency::Biweekly
        | ApplicationFrequency::Monthly => config
            .application_day
            .as_deref()
            .is_some_and(|day| weekday_matches(day, weekday)),
    }
}

/// Hydration fires on the hour, inside [`HYDRATION_WINDOW`], when the hour is
/// a multiple of the interval. The window start itself only fires if it is a
/// multiple too.
fn hydration_due(now: ClockTime, interval_hours: u32) -> bool {
    interval_hours > 0
        && now.minute() == 0
        && HYDRATION_WINDOW.contains(&now.hour())
        && u32::from(now.hour()) % interval_hours == 0
}

/// Compare a stored weekday name with `weekday`.
///
/// Accepts the pt-BR long name (`"segunda-feira"`), its short form
/// (`"segunda"`) and the English name, case-insensitively. `ç` and `á` may be
/// written without the accent.
pub fn weekday_matches(name: &str, weekday: Weekday) -> bool {
    let target = fold(name.trim());
    if target.is_empty() {
        return false;
    }
    let long = fold(weekday_name_pt(weekday));
    let short = long.split('-').next().unwrap_or_default();
    target == long || target == short || target == weekday_name_en(weekday)
}

/// pt-BR long weekday name, as the client displays it.
pub fn weekday_name_pt(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

fn weekday_name_en(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'ç' => 'c',
            'á' => 'a',
            other => other,
        })
        .collect()
}
