//! Destination business logic.
//!
//! Destination ids are not allocated locally: the remote mirror assigns them
//! and the flow passes the returned id into [`insert_destination`].

use crate::{
    core::{ListQuery, guards, ids, require_text},
    entities::{Destination, Trip, destination, trip},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

const CITY_REQUIRED: &str = "Please enter a city name";
const COUNTRY_REQUIRED: &str = "Please enter a country name";

/// A destination about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDestination {
    pub id: i64,
    pub city: String,
    pub country: String,
    pub image: Option<Vec<u8>>,
    pub image_url: Option<String>,
}

/// Fields of a destination to overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationChanges {
    pub city: Option<String>,
    pub country: Option<String>,
    pub image: Option<Vec<u8>>,
    pub image_url: Option<String>,
}

pub fn validate_destination_fields(city: &str, country: &str) -> Result<()> {
    require_text(city, CITY_REQUIRED)?;
    require_text(country, COUNTRY_REQUIRED)?;
    Ok(())
}

/// Stores a new destination under the id the remote assigned.
///
/// Fails if the id is not positive or already taken.
pub async fn insert_destination(
    db: &DatabaseConnection,
    new: NewDestination,
) -> Result<destination::Model> {
    let city = require_text(&new.city, CITY_REQUIRED)?;
    let country = require_text(&new.country, COUNTRY_REQUIRED)?;
    if new.id <= 0 {
        return Err(Error::validation(format!(
            "Destination id must be positive, got {}",
            new.id
        )));
    }

    let txn = db.begin().await?;

    if Destination::find_by_id(new.id).one(&txn).await?.is_some() {
        return Err(Error::validation(format!(
            "Destination {} already exists",
            new.id
        )));
    }

    let model = destination::ActiveModel {
        id: Set(new.id),
        city: Set(city),
        country: Set(country),
        image: Set(new.image),
        image_url: Set(new.image_url),
    }
    .insert(&txn)
    .await?;

    ids::record_issued_id::<Destination, _>(&txn, model.id).await?;
    txn.commit().await?;

    info!(id = model.id, city = %model.city, "Destination stored");
    Ok(model)
}

pub async fn get_destination_by_id(
    db: &DatabaseConnection,
    destination_id: i64,
) -> Result<Option<destination::Model>> {
    Destination::find_by_id(destination_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_destination_by_id`] but a missing record is an error.
pub async fn require_destination(
    db: &DatabaseConnection,
    destination_id: i64,
) -> Result<destination::Model> {
    get_destination_by_id(db, destination_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Destination",
            id: destination_id,
        })
}

/// Applies `changes` to a stored destination.
pub async fn update_destination(
    db: &DatabaseConnection,
    destination_id: i64,
    changes: DestinationChanges,
) -> Result<destination::Model> {
    let existing = require_destination(db, destination_id).await?;
    let mut active_model: destination::ActiveModel = existing.into();

    if let Some(city) = changes.city {
        active_model.city = Set(require_text(&city, CITY_REQUIRED)?);
    }
    if let Some(country) = changes.country {
        active_model.country = Set(require_text(&country, COUNTRY_REQUIRED)?);
    }
    if let Some(image) = changes.image {
        active_model.image = Set(Some(image));
    }
    if let Some(url) = changes.image_url {
        active_model.image_url = Set(Some(url));
    }

    let updated = active_model.update(db).await?;
    debug!(id = destination_id, "Destination updated");
    Ok(updated)
}

/// Stores downloaded image bytes for a destination.
pub async fn set_destination_image(
    db: &DatabaseConnection,
    destination_id: i64,
    image: Vec<u8>,
) -> Result<destination::Model> {
    update_destination(
        db,
        destination_id,
        DestinationChanges {
            image: Some(image),
            ..DestinationChanges::default()
        },
    )
    .await
}

pub async fn count_trips_for_destination(
    db: &DatabaseConnection,
    destination_id: i64,
) -> Result<u64> {
    Trip::find()
        .filter(trip::Column::DestinationId.eq(destination_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Checks that a destination exists and has no trips, without deleting it.
pub async fn check_destination_deletable(
    db: &DatabaseConnection,
    destination_id: i64,
) -> Result<destination::Model> {
    let destination = require_destination(db, destination_id).await?;
    guards::ensure_destination_has_no_trips(count_trips_for_destination(db, destination_id).await?)?;
    Ok(destination)
}

pub async fn delete_destination(db: &DatabaseConnection, destination_id: i64) -> Result<()> {
    check_destination_deletable(db, destination_id).await?;
    Destination::delete_by_id(destination_id).exec(db).await?;
    info!(id = destination_id, "Destination deleted");
    Ok(())
}

/// Destinations sorted by city, optionally filtered on city or country.
pub async fn list_destinations(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Vec<destination::Model>> {
    let destinations = Destination::find()
        .order_by(destination::Column::City, query.order.into())
        .order_by_asc(destination::Column::Id)
        .all(db)
        .await?;

    Ok(destinations
        .into_iter()
        .filter(|d| query.matches(&[&d.city, &d.country]))
        .collect())
}

/// Inserts or overwrites a destination received from the remote mirror.
///
/// City and country are overwritten; the image URL only when one is given.
/// Returns the stored model and whether it was newly created.
pub async fn upsert_destination(
    db: &DatabaseConnection,
    destination_id: i64,
    city: String,
    country: String,
    image_url: Option<String>,
) -> Result<(destination::Model, bool)> {
    if get_destination_by_id(db, destination_id).await?.is_some() {
        let updated = update_destination(
            db,
            destination_id,
            DestinationChanges {
                city: Some(city),
                country: Some(country),
                image: None,
                image_url,
            },
        )
        .await?;
        return Ok((updated, false));
    }

    let created = insert_destination(
        db,
        NewDestination {
            id: destination_id,
            city,
            country,
            image: None,
            image_url,
        },
    )
    .await?;
    Ok((created, true))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_destination, create_test_trip, setup_test_store};
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_validation_runs_before_any_query() -> Result<()> {
        // No query results are scripted, so touching the database would fail
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = insert_destination(
            &db,
            NewDestination {
                id: 1,
                city: "   ".to_string(),
                country: "France".to_string(),
                image: None,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), CITY_REQUIRED);

        let err = insert_destination(
            &db,
            NewDestination {
                id: 0,
                city: "Paris".to_string(),
                country: "France".to_string(),
                image: None,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_and_duplicate_id() -> Result<()> {
        let store = setup_test_store().await?;
        let paris = create_test_destination(&store, 7, "Paris").await?;
        assert_eq!(paris.id, 7);
        assert_eq!(paris.country, "France");

        let err = create_test_destination(&store, 7, "Lyon").await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(list_destinations(&store, &ListQuery::default()).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_destination(&store, 1, "Paris").await?;

        let updated = update_destination(
            &store,
            1,
            DestinationChanges {
                city: Some(" Marseille ".to_string()),
                image_url: Some("https://img.example/m.jpg".to_string()),
                ..DestinationChanges::default()
            },
        )
        .await?;
        assert_eq!(updated.city, "Marseille");
        assert_eq!(updated.country, "France");
        assert_eq!(updated.image_url.as_deref(), Some("https://img.example/m.jpg"));

        let err = update_destination(
            &store,
            1,
            DestinationChanges {
                country: Some(String::new()),
                ..DestinationChanges::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), COUNTRY_REQUIRED);
        assert_eq!(require_destination(&store, 1).await?.country, "France");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_blocked_by_trips() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_destination(&store, 1, "Paris").await?;
        create_test_trip(&store, 1, "Spring", Duration::days(10)).await?;
        create_test_trip(&store, 1, "Autumn", Duration::days(100)).await?;

        let err = delete_destination(&store, 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete - 2 associated trips exist");
        assert!(get_destination_by_id(&store, 1).await?.is_some());

        create_test_destination(&store, 2, "Nice").await?;
        delete_destination(&store, 2).await?;
        assert!(get_destination_by_id(&store, 2).await?.is_none());

        let err = delete_destination(&store, 2).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { id: 2, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_sorted_and_searched() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_destination(&store, 1, "Rome").await?;
        create_test_destination(&store, 2, "Amsterdam").await?;
        create_test_destination(&store, 3, "Paris").await?;

        let cities = |list: Vec<destination::Model>| -> Vec<String> {
            list.into_iter().map(|d| d.city).collect()
        };

        let all = list_destinations(&store, &ListQuery::default()).await?;
        assert_eq!(cities(all), ["Amsterdam", "Paris", "Rome"]);

        let desc = list_destinations(&store, &ListQuery::default().descending()).await?;
        assert_eq!(cities(desc), ["Rome", "Paris", "Amsterdam"]);

        let found = list_destinations(&store, &ListQuery::search("am")).await?;
        assert_eq!(cities(found), ["Amsterdam"]);

        // Country matches too
        let french = list_destinations(&store, &ListQuery::search("fRaNcE")).await?;
        assert_eq!(french.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_and_deleted_id_not_reused() -> Result<()> {
        let store = setup_test_store().await?;

        let (created, is_new) = upsert_destination(
            &store,
            4,
            "Oslo".to_string(),
            "Norway".to_string(),
            Some("https://img.example/oslo.jpg".to_string()),
        )
        .await?;
        assert!(is_new);
        assert_eq!(created.image_url.as_deref(), Some("https://img.example/oslo.jpg"));

        let (updated, is_new) =
            upsert_destination(&store, 4, "Bergen".to_string(), "Norway".to_string(), None)
                .await?;
        assert!(!is_new);
        assert_eq!(updated.city, "Bergen");
        assert_eq!(updated.image_url.as_deref(), Some("https://img.example/oslo.jpg"));

        set_destination_image(&store, 4, vec![1, 2, 3]).await?;
        assert_eq!(require_destination(&store, 4).await?.image, Some(vec![1, 2, 3]));

        delete_destination(&store, 4).await?;
        assert_eq!(store.next_id::<Destination>().await?, 5);
        Ok(())
    }
}
