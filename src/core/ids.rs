//! Identifier allocation.
//!
//! A new record gets `max(existing ids) + 1`, starting at 1. Each table also
//! has a high-water mark in `system_state` that is raised whenever an id is
//! stored, so deleting the newest record does not hand its id out again.

use crate::{
    core::system_state,
    entities::NumericId,
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, EntityName, EntityTrait, QueryOrder};
use tracing::debug;

const WATERMARK_PREFIX: &str = "id_watermark.";

fn watermark_key<E: NumericId>() -> String {
    format!("{WATERMARK_PREFIX}{}", E::default().table_name())
}

/// Highest id ever stored in `E`'s table, 0 if none.
pub async fn watermark<E, C>(db: &C) -> Result<i64>
where
    E: NumericId,
    C: ConnectionTrait,
{
    let key = watermark_key::<E>();
    match system_state::get_value(db, &key).await? {
        None => Ok(0),
        Some(raw) => raw.parse().map_err(|e| Error::Storage {
            message: format!("Corrupt id watermark {key}={raw:?}: {e}"),
        }),
    }
}

/// Next identifier for a record of kind `E`.
///
/// # Errors
/// Returns an error if the current maximum cannot be read.
pub async fn next_id<E, C>(db: &C) -> Result<i64>
where
    E: NumericId,
    C: ConnectionTrait,
{
    let highest = E::find()
        .order_by_desc(E::id_column())
        .one(db)
        .await?
        .map_or(0, |model| E::id_of(&model));

    let next = highest.max(watermark::<E, C>(db).await?) + 1;
    debug!(table = E::default().table_name(), next, "Allocated id");
    Ok(next)
}

/// Raises the high-water mark of `E` to `id` if it is below it.
///
/// Called inside the insert transaction so the mark and the row land
/// together.
pub async fn record_issued_id<E, C>(db: &C, id: i64) -> Result<()>
where
    E: NumericId,
    C: ConnectionTrait,
{
    if id > watermark::<E, C>(db).await? {
        system_state::set_value(db, &watermark_key::<E>(), id.to_string()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Destination, Trip};
    use crate::test_utils::setup_test_store;

    #[tokio::test]
    async fn test_first_id_is_one() -> Result<()> {
        let store = setup_test_store().await?;
        assert_eq!(next_id::<Trip, _>(&*store).await?, 1);
        assert_eq!(next_id::<Destination, _>(&*store).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_watermark_only_rises() -> Result<()> {
        let store = setup_test_store().await?;

        record_issued_id::<Trip, _>(&*store, 4).await?;
        record_issued_id::<Trip, _>(&*store, 2).await?;
        assert_eq!(watermark::<Trip, _>(&*store).await?, 4);
        assert_eq!(next_id::<Trip, _>(&*store).await?, 5);

        // Watermarks are per table
        assert_eq!(next_id::<Destination, _>(&*store).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_watermark_is_storage_error() -> Result<()> {
        let store = setup_test_store().await?;
        system_state::set_value(&*store, "id_watermark.trips", "seven".to_string()).await?;

        let err = next_id::<Trip, _>(&*store).await.unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        Ok(())
    }
}
