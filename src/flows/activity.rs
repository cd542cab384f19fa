//! Activity actions.
//!
//! Unlike trips, activities are still saved when there is no network path;
//! the mirror simply does not hear about them.

use crate::{
    core::{
        activity::{self, ActivityChanges, NewActivity},
        trip,
    },
    entities::{Activity, activity as activity_entity},
    errors::Result,
    flows::SyncContext,
    remote::{RemoteRequest, payloads::ApiActivity},
    sync::SyncOp,
};

pub async fn add_activity(
    ctx: &SyncContext,
    new: NewActivity,
) -> Result<activity_entity::Model> {
    activity::validate_activity_fields(&new.name, &new.location)?;
    trip::require_trip(&ctx.store, new.trip_id).await?;

    let activity_id = ctx.store.next_id::<Activity>().await?;
    let op = SyncOp::new(
        "add activities",
        RemoteRequest::post(
            ctx.endpoints.activities(),
            &ApiActivity::new(activity_id, &new),
        )?,
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, |_| activity::insert_activity(&ctx.store, activity_id, &new))
        .await
}

pub async fn update_activity(
    ctx: &SyncContext,
    activity_id: i64,
    changes: ActivityChanges,
) -> Result<activity_entity::Model> {
    let current = activity::check_activity_updatable(&ctx.store, activity_id, &changes).await?;

    let op = SyncOp::new(
        "update activities",
        RemoteRequest::put(
            ctx.endpoints.activity(activity_id),
            &ApiActivity::changed(activity_id, current.trip_id, &changes),
        )?,
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, move |_| {
            activity::apply_activity_changes(&ctx.store, current, changes)
        })
        .await
}

pub async fn delete_activity(ctx: &SyncContext, activity_id: i64) -> Result<()> {
    activity::check_activity_deletable(&ctx.store, activity_id).await?;

    let op = SyncOp::new(
        "delete activities",
        RemoteRequest::delete(ctx.endpoints.activity(activity_id)),
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, |_| activity::remove_activity(&ctx.store, activity_id))
        .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        errors::Error,
        remote::Method,
        test_utils::{
            ScriptedRemote, create_test_activity, setup_with_trip, test_context,
            test_context_with_delay,
        },
    };
    use chrono::{Duration, Local, NaiveTime};
    use std::sync::Arc;

    fn dinner(trip_id: i64) -> NewActivity {
        NewActivity {
            trip_id,
            name: "Dinner".to_string(),
            location: "Le Marais".to_string(),
            date: Local::now().date_naive() + Duration::days(3),
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_offline_add_is_saved_locally() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let remote = Arc::new(ScriptedRemote::succeeding());
        let ctx = test_context(store.clone(), &remote, false);

        let stored = add_activity(&ctx, dinner(trip.id)).await?;
        assert_eq!(stored.id, 1);
        assert_eq!(remote.attempts(), 0);
        assert!(store.find::<Activity>(1).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_online_add_posts_payload() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let remote = Arc::new(ScriptedRemote::succeeding());
        let ctx = test_context(store, &remote, true);

        add_activity(&ctx, dinner(trip.id)).await?;

        let request = &remote.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/activities");
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["time"], "19:30");
        assert_eq!(body["trip_id"], trip.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_remote_stores_nothing() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let remote = Arc::new(ScriptedRemote::failing());
        let ctx = test_context(store.clone(), &remote, true);

        let err = add_activity(&ctx, dinner(trip.id)).await.unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { .. }));
        assert!(store.find::<Activity>(1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_past_activity_delete_makes_no_request() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let past = create_test_activity(&store, trip.id, -Duration::hours(3)).await?;
        let remote = Arc::new(ScriptedRemote::succeeding());
        let ctx = test_context(store.clone(), &remote, true);

        let err = delete_activity(&ctx, past.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete past activities");
        assert_eq!(remote.attempts(), 0);
        assert!(store.find::<Activity>(past.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_then_delete_upcoming() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let upcoming = create_test_activity(&store, trip.id, Duration::days(1)).await?;
        let remote = Arc::new(ScriptedRemote::succeeding());
        let ctx = test_context(store.clone(), &remote, true);

        let changes = ActivityChanges {
            name: "Opera".to_string(),
            location: "Palais Garnier".to_string(),
            date: upcoming.date + Duration::days(1),
            time: upcoming.time,
        };
        let updated = update_activity(&ctx, upcoming.id, changes).await?;
        assert_eq!(updated.name, "Opera");

        delete_activity(&ctx, upcoming.id).await?;
        let paths: Vec<String> = remote.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, [format!("/activities/{}", upcoming.id), format!("/activities/{}", upcoming.id)]);
        assert!(store.find::<Activity>(upcoming.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_commits_when_activity_begins_during_retry() -> Result<()> {
        let (store, _, trip) = setup_with_trip().await?;
        let soon = create_test_activity(&store, trip.id, Duration::seconds(2)).await?;
        let remote = Arc::new(ScriptedRemote::succeeding());
        remote.push_response(503, None);
        let ctx = test_context_with_delay(
            store.clone(),
            &remote,
            true,
            std::time::Duration::from_millis(2500),
        );

        delete_activity(&ctx, soon.id).await?;
        assert_eq!(remote.attempts(), 2);
        assert!(store.find::<Activity>(soon.id).await?.is_none());
        Ok(())
    }
}
