//! Temporal and relationship guards.
//!
//! Pure checks over already-loaded records. `now` is always passed in so the
//! callers decide which clock applies: trips and expenses are compared in
//! UTC, activities in local wall-clock time since their date and time are
//! entered that way.

use crate::{
    entities::{activity, expense, trip},
    errors::{Error, Result},
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// Expenses older than this many whole days are frozen.
pub const EXPENSE_EDIT_WINDOW_DAYS: i64 = 30;

/// The mutation a guard is protecting against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Update,
    Delete,
}

impl fmt::Display for GuardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Local wall-clock time, for activity comparisons.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn ensure_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start > end {
        return Err(Error::validation("Start date must be before end date"));
    }
    Ok(())
}

/// A trip can only change while it has not started yet.
pub fn ensure_trip_not_started(
    trip: &trip::Model,
    action: GuardAction,
    now: DateTime<Utc>,
) -> Result<()> {
    if trip.start_date <= now {
        return Err(Error::validation(format!("Cannot {action} started trips")));
    }
    Ok(())
}

pub fn ensure_trip_has_no_children(activities: u64, expenses: u64) -> Result<()> {
    if activities > 0 {
        return Err(Error::validation("Cannot delete trip with activities"));
    }
    if expenses > 0 {
        return Err(Error::validation("Cannot delete trip with expenses"));
    }
    Ok(())
}

pub fn ensure_destination_has_no_trips(trips: u64) -> Result<()> {
    if trips > 0 {
        return Err(Error::validation(format!(
            "Cannot delete - {trips} associated trips exist"
        )));
    }
    Ok(())
}

/// Combined local date and time an activity starts at.
#[must_use]
pub fn activity_starts_at(activity: &activity::Model) -> NaiveDateTime {
    activity.date.and_time(activity.time)
}

pub fn ensure_activity_upcoming(
    activity: &activity::Model,
    action: GuardAction,
    now: NaiveDateTime,
) -> Result<()> {
    if activity_starts_at(activity) <= now {
        return Err(Error::validation(format!(
            "Cannot {action} past activities"
        )));
    }
    Ok(())
}

/// Rejects moving an activity to a day before `today`.
pub fn ensure_not_before_today(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date < today {
        return Err(Error::validation("Activity date cannot be in the past"));
    }
    Ok(())
}

/// Whole days elapsed must not exceed [`EXPENSE_EDIT_WINDOW_DAYS`].
pub fn ensure_expense_recent(
    expense: &expense::Model,
    action: GuardAction,
    now: DateTime<Utc>,
) -> Result<()> {
    let age = (now - expense.date).num_days();
    if age > EXPENSE_EDIT_WINDOW_DAYS {
        return Err(Error::validation(format!(
            "Cannot {action} expenses older than {EXPENSE_EDIT_WINDOW_DAYS} days"
        )));
    }
    Ok(())
}
