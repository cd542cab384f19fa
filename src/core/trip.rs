//! Trip business logic - create, query, update and delete trips.
//!
//! Trips are guarded on both sides: they can only change before they start,
//! and they can only be deleted once they have no activities or expenses.

use crate::{
    core::{
        ListQuery, guards,
        guards::GuardAction,
        ids, require_text,
    },
    entities::{Activity, Destination, Expense, Trip, activity, expense, trip},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

const TITLE_REQUIRED: &str = "Please enter trip title";

/// A trip about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub destination_id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// The editable part of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripChanges {
    pub title: String,
    pub end_date: DateTime<Utc>,
}

/// Checks the fields that do not need the database.
pub fn validate_new_trip(new: &NewTrip) -> Result<()> {
    require_text(&new.title, TITLE_REQUIRED)?;
    guards::ensure_date_range(new.start_date, new.end_date)
}

/// Stores a new trip under `trip_id`.
///
/// The destination must exist and the id must be free.
pub async fn insert_trip(
    db: &DatabaseConnection,
    trip_id: i64,
    new: &NewTrip,
) -> Result<trip::Model> {
    validate_new_trip(new)?;

    let txn = db.begin().await?;

    if Destination::find_by_id(new.destination_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(Error::NotFound {
            entity: "Destination",
            id: new.destination_id,
        });
    }
    if Trip::find_by_id(trip_id).one(&txn).await?.is_some() {
        return Err(Error::validation(format!("Trip {trip_id} already exists")));
    }

    let model = trip::ActiveModel {
        id: Set(trip_id),
        destination_id: Set(new.destination_id),
        title: Set(new.title.trim().to_string()),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
    }
    .insert(&txn)
    .await?;

    ids::record_issued_id::<Trip, _>(&txn, trip_id).await?;
    txn.commit().await?;

    info!(id = trip_id, title = %model.title, "Trip stored");
    Ok(model)
}

pub async fn get_trip_by_id(db: &DatabaseConnection, trip_id: i64) -> Result<Option<trip::Model>> {
    Trip::find_by_id(trip_id).one(db).await.map_err(Into::into)
}

pub async fn require_trip(db: &DatabaseConnection, trip_id: i64) -> Result<trip::Model> {
    get_trip_by_id(db, trip_id).await?.ok_or(Error::NotFound {
        entity: "Trip",
        id: trip_id,
    })
}

pub async fn count_activities_for_trip(db: &DatabaseConnection, trip_id: i64) -> Result<u64> {
    Activity::find()
        .filter(activity::Column::TripId.eq(trip_id))
        .count(db)
        .await
        .map_err(Into::into)
}

pub async fn count_expenses_for_trip(db: &DatabaseConnection, trip_id: i64) -> Result<u64> {
    Expense::find()
        .filter(expense::Column::TripId.eq(trip_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Checks that `changes` may be applied to the stored trip, without
/// applying them. Returns the trip as currently stored.
pub async fn check_trip_updatable(
    db: &DatabaseConnection,
    trip_id: i64,
    changes: &TripChanges,
) -> Result<trip::Model> {
    require_text(&changes.title, TITLE_REQUIRED)?;
    let trip = require_trip(db, trip_id).await?;
    guards::ensure_trip_not_started(&trip, GuardAction::Update, Utc::now())?;

    if changes.end_date < trip.start_date {
        return Err(Error::validation(format!(
            "End date cannot be before {}",
            trip.start_date.format("%b %-d, %Y")
        )));
    }
    Ok(trip)
}

pub async fn update_trip(
    db: &DatabaseConnection,
    trip_id: i64,
    changes: TripChanges,
) -> Result<trip::Model> {
    let trip = check_trip_updatable(db, trip_id, &changes).await?;
    apply_trip_changes(db, trip, changes).await
}

/// Writes `changes` over a trip already passed by [`check_trip_updatable`].
/// The guards are not evaluated again.
pub async fn apply_trip_changes(
    db: &DatabaseConnection,
    trip: trip::Model,
    changes: TripChanges,
) -> Result<trip::Model> {
    let trip_id = trip.id;
    let mut active_model: trip::ActiveModel = trip.into();
    active_model.title = Set(changes.title.trim().to_string());
    active_model.end_date = Set(changes.end_date);

    let updated = active_model.update(db).await?;
    info!(id = trip_id, "Trip updated");
    Ok(updated)
}

/// Checks every delete guard, without deleting.
pub async fn check_trip_deletable(db: &DatabaseConnection, trip_id: i64) -> Result<trip::Model> {
    let trip = require_trip(db, trip_id).await?;
    guards::ensure_trip_has_no_children(
        count_activities_for_trip(db, trip_id).await?,
        count_expenses_for_trip(db, trip_id).await?,
    )?;
    guards::ensure_trip_not_started(&trip, GuardAction::Delete, Utc::now())?;
    Ok(trip)
}

pub async fn delete_trip(db: &DatabaseConnection, trip_id: i64) -> Result<()> {
    check_trip_deletable(db, trip_id).await?;
    remove_trip(db, trip_id).await
}

/// Deletes without evaluating the delete guards.
pub async fn remove_trip(db: &DatabaseConnection, trip_id: i64) -> Result<()> {
    Trip::delete_by_id(trip_id).exec(db).await?;
    info!(id = trip_id, "Trip deleted");
    Ok(())
}

/// Trips sorted by title, optionally limited to one destination and
/// filtered on title.
pub async fn list_trips(db: &DatabaseConnection, query: &ListQuery) -> Result<Vec<trip::Model>> {
    let mut select = Trip::find();
    if let Some(destination_id) = query.parent_id {
        select = select.filter(trip::Column::DestinationId.eq(destination_id));
    }

    let trips = select
        .order_by(trip::Column::Title, query.order.into())
        .order_by_asc(trip::Column::Id)
        .all(db)
        .await?;

    Ok(trips
        .into_iter()
        .filter(|t| query.matches(&[&t.title]))
        .collect())
}

/// Inserts or overwrites a trip received from the remote mirror.
///
/// The remote copy wins: guards do not apply here. Returns the stored model
/// and whether it was newly created.
pub async fn upsert_trip(
    db: &DatabaseConnection,
    trip_id: i64,
    incoming: &NewTrip,
) -> Result<(trip::Model, bool)> {
    let Some(existing) = get_trip_by_id(db, trip_id).await? else {
        return Ok((insert_trip(db, trip_id, incoming).await?, true));
    };

    validate_new_trip(incoming)?;
    let mut active_model: trip::ActiveModel = existing.into();
    active_model.destination_id = Set(incoming.destination_id);
    active_model.title = Set(incoming.title.trim().to_string());
    active_model.start_date = Set(incoming.start_date);
    active_model.end_date = Set(incoming.end_date);

    Ok((active_model.update(db).await?, false))
}
