//! JSON shapes exchanged with the mirror.
//!
//! The mirror stores destination and trip ids as strings and trip dates as
//! epoch seconds; activity and expense payloads use plain numbers and
//! calendar strings.

use crate::{
    core::{
        activity::{ActivityChanges, NewActivity},
        expense::{ExpenseChanges, NewExpense},
        trip::NewTrip,
    },
    entities::trip,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDestination {
    /// Absent when creating; the mirror assigns it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub city: String,
    pub country: String,
    #[serde(rename = "destinationImageURL", default)]
    pub image_url: String,
}

impl ApiDestination {
    #[must_use]
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.as_deref().and_then(parse_id)
    }

    /// The image URL, or `None` when the mirror sent an empty string.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        let url = self.image_url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrip {
    pub id: String,
    pub title: String,
    pub start_date: i64,
    pub end_date: i64,
    pub destination_id: String,
}

impl ApiTrip {
    #[must_use]
    pub fn new(trip_id: i64, trip: &NewTrip) -> Self {
        Self {
            id: trip_id.to_string(),
            title: trip.title.trim().to_string(),
            start_date: trip.start_date.timestamp(),
            end_date: trip.end_date.timestamp(),
            destination_id: trip.destination_id.to_string(),
        }
    }

    #[must_use]
    pub fn from_model(trip: &trip::Model) -> Self {
        Self {
            id: trip.id.to_string(),
            title: trip.title.clone(),
            start_date: trip.start_date.timestamp(),
            end_date: trip.end_date.timestamp(),
            destination_id: trip.destination_id.to_string(),
        }
    }

    /// Converts to a storable trip; `None` if an id or a date is unusable.
    #[must_use]
    pub fn to_new_trip(&self) -> Option<(i64, NewTrip)> {
        let trip_id = parse_id(&self.id)?;
        let destination_id = parse_id(&self.destination_id)?;
        Some((
            trip_id,
            NewTrip {
                destination_id,
                title: self.title.clone(),
                start_date: DateTime::<Utc>::from_timestamp(self.start_date, 0)?,
                end_date: DateTime::<Utc>::from_timestamp(self.end_date, 0)?,
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiActivity {
    pub id: i64,
    pub name: String,
    pub location: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub trip_id: i64,
}

impl ApiActivity {
    fn build(
        activity_id: i64,
        trip_id: i64,
        name: &str,
        location: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            id: activity_id,
            name: name.trim().to_string(),
            location: location.trim().to_string(),
            date: date.format(DATE_FORMAT).to_string(),
            time: time.format(TIME_FORMAT).to_string(),
            trip_id,
        }
    }

    #[must_use]
    pub fn new(activity_id: i64, activity: &NewActivity) -> Self {
        Self::build(
            activity_id,
            activity.trip_id,
            &activity.name,
            &activity.location,
            activity.date,
            activity.time,
        )
    }

    #[must_use]
    pub fn changed(activity_id: i64, trip_id: i64, changes: &ActivityChanges) -> Self {
        Self::build(
            activity_id,
            trip_id,
            &changes.name,
            &changes.location,
            changes.date,
            changes.time,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiExpense {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub trip_id: i64,
}

impl ApiExpense {
    #[must_use]
    pub fn new(expense_id: i64, expense: &NewExpense) -> Self {
        Self {
            id: expense_id,
            title: expense.title.trim().to_string(),
            amount: expense.amount,
            date: expense.date.format(DATE_FORMAT).to_string(),
            trip_id: expense.trip_id,
        }
    }

    #[must_use]
    pub fn changed(expense_id: i64, trip_id: i64, changes: &ExpenseChanges) -> Self {
        Self {
            id: expense_id,
            title: changes.title.trim().to_string(),
            amount: changes.amount,
            date: changes.date.format(DATE_FORMAT).to_string(),
            trip_id,
        }
    }
}

/// Image host reply: `{"data": {"url": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUploadResponse {
    pub data: ImageUploadData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUploadData {
    pub url: String,
}
