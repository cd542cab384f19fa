//! Trip actions. Trips need the mirror: every action aborts when offline.

use crate::{
    core::{
        destination,
        trip::{self, NewTrip, TripChanges},
    },
    entities::{Trip, trip as trip_entity},
    errors::Result,
    flows::SyncContext,
    remote::{RemoteRequest, payloads::ApiTrip},
    sync::SyncOp,
};

pub async fn add_trip(ctx: &SyncContext, new: NewTrip) -> Result<trip_entity::Model> {
    trip::validate_new_trip(&new)?;
    destination::require_destination(&ctx.store, new.destination_id).await?;

    let trip_id = ctx.store.next_id::<Trip>().await?;
    let op = SyncOp::new(
        "add trips",
        RemoteRequest::post(
            ctx.endpoints.trips(new.destination_id),
            &ApiTrip::new(trip_id, &new),
        )?,
    );

    ctx.executor
        .execute(&op, |_| trip::insert_trip(&ctx.store, trip_id, &new))
        .await
}

/// Changes the title and end date of a trip that has not started.
pub async fn update_trip(
    ctx: &SyncContext,
    trip_id: i64,
    changes: TripChanges,
) -> Result<trip_entity::Model> {
    let current = trip::check_trip_updatable(&ctx.store, trip_id, &changes).await?;

    let payload = ApiTrip {
        title: changes.title.trim().to_string(),
        end_date: changes.end_date.timestamp(),
        ..ApiTrip::from_model(&current)
    };
    let op = SyncOp::new(
        "update trips",
        RemoteRequest::put(
            ctx.endpoints.trip(current.destination_id, trip_id),
            &payload,
        )?,
    );

    ctx.executor
        .execute(&op, move |_| trip::apply_trip_changes(&ctx.store, current, changes))
        .await
}

pub async fn delete_trip(ctx: &SyncContext, trip_id: i64) -> Result<()> {
    // Guards are judged once, before the mirror sees the request
    let current = trip::check_trip_deletable(&ctx.store, trip_id).await?;

    let op = SyncOp::new(
        "delete trips",
        RemoteRequest::delete(ctx.endpoints.trip(current.destination_id, trip_id)),
    );
    ctx.executor
        .execute(&op, |_| trip::remove_trip(&ctx.store, trip_id))
        .await
}
