//! Activity business logic.
//!
//! An activity is editable until the moment it starts, measured in local
//! wall-clock time.

use crate::{
    core::{ListQuery, guards, guards::GuardAction, ids, require_text},
    entities::{Activity, Trip, activity},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

const NAME_REQUIRED: &str = "Please enter activity name";
const LOCATION_REQUIRED: &str = "Please enter location";

/// An activity about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub trip_id: i64,
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Replacement values for every editable field of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityChanges {
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

pub fn validate_activity_fields(name: &str, location: &str) -> Result<()> {
    require_text(name, NAME_REQUIRED)?;
    require_text(location, LOCATION_REQUIRED)?;
    Ok(())
}

pub async fn insert_activity(
    db: &DatabaseConnection,
    activity_id: i64,
    new: &NewActivity,
) -> Result<activity::Model> {
    validate_activity_fields(&new.name, &new.location)?;

    let txn = db.begin().await?;

    if Trip::find_by_id(new.trip_id).one(&txn).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Trip",
            id: new.trip_id,
        });
    }
    if Activity::find_by_id(activity_id).one(&txn).await?.is_some() {
        return Err(Error::validation(format!(
            "Activity {activity_id} already exists"
        )));
    }

    let model = activity::ActiveModel {
        id: Set(activity_id),
        trip_id: Set(new.trip_id),
        name: Set(new.name.trim().to_string()),
        location: Set(new.location.trim().to_string()),
        date: Set(new.date),
        time: Set(new.time),
    }
    .insert(&txn)
    .await?;

    ids::record_issued_id::<Activity, _>(&txn, activity_id).await?;
    txn.commit().await?;

    info!(id = activity_id, trip_id = new.trip_id, "Activity stored");
    Ok(model)
}

pub async fn get_activity_by_id(
    db: &DatabaseConnection,
    activity_id: i64,
) -> Result<Option<activity::Model>> {
    Activity::find_by_id(activity_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn require_activity(
    db: &DatabaseConnection,
    activity_id: i64,
) -> Result<activity::Model> {
    get_activity_by_id(db, activity_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Activity",
            id: activity_id,
        })
}

pub async fn check_activity_updatable(
    db: &DatabaseConnection,
    activity_id: i64,
    changes: &ActivityChanges,
) -> Result<activity::Model> {
    validate_activity_fields(&changes.name, &changes.location)?;
    let activity = require_activity(db, activity_id).await?;

    let now = guards::local_now();
    guards::ensure_activity_upcoming(&activity, GuardAction::Update, now)?;
    guards::ensure_not_before_today(changes.date, now.date())?;
    Ok(activity)
}

pub async fn update_activity(
    db: &DatabaseConnection,
    activity_id: i64,
    changes: ActivityChanges,
) -> Result<activity::Model> {
    let activity = check_activity_updatable(db, activity_id, &changes).await?;
    apply_activity_changes(db, activity, changes).await
}

/// Writes `changes` over an activity already passed by
/// [`check_activity_updatable`].
pub async fn apply_activity_changes(
    db: &DatabaseConnection,
    activity: activity::Model,
    changes: ActivityChanges,
) -> Result<activity::Model> {
    let activity_id = activity.id;
    let mut active_model: activity::ActiveModel = activity.into();
    active_model.name = Set(changes.name.trim().to_string());
    active_model.location = Set(changes.location.trim().to_string());
    active_model.date = Set(changes.date);
    active_model.time = Set(changes.time);

    let updated = active_model.update(db).await?;
    info!(id = activity_id, "Activity updated");
    Ok(updated)
}

pub async fn check_activity_deletable(
    db: &DatabaseConnection,
    activity_id: i64,
) -> Result<activity::Model> {
    let activity = require_activity(db, activity_id).await?;
    guards::ensure_activity_upcoming(&activity, GuardAction::Delete, guards::local_now())?;
    Ok(activity)
}

pub async fn delete_activity(db: &DatabaseConnection, activity_id: i64) -> Result<()> {
    check_activity_deletable(db, activity_id).await?;
    remove_activity(db, activity_id).await
}

pub async fn remove_activity(db: &DatabaseConnection, activity_id: i64) -> Result<()> {
    Activity::delete_by_id(activity_id).exec(db).await?;
    info!(id = activity_id, "Activity deleted");
    Ok(())
}

/// Activities in id order, optionally limited to one trip and filtered on
/// name.
pub async fn list_activities(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Vec<activity::Model>> {
    let mut select = Activity::find();
    if let Some(trip_id) = query.parent_id {
        select = select.filter(activity::Column::TripId.eq(trip_id));
    }

    let activities = select
        .order_by(activity::Column::Id, query.order.into())
        .all(db)
        .await?;

    Ok(activities
        .into_iter()
        .filter(|a| query.matches(&[&a.name]))
        .collect())
}
