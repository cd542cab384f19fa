//! Key/value bookkeeping in the `system_state` table.

use crate::{
    entities::{SystemState, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};

/// Reads the value stored under `key`, if any.
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find_by_id(key.to_string()).one(db).await?;
    Ok(state.map(|s| s.value))
}

/// Stores `value` under `key`, replacing any previous value.
pub async fn set_value<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    if let Some(state) = SystemState::find_by_id(key.to_string()).one(db).await? {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_store;

    #[tokio::test]
    async fn test_set_then_overwrite() -> Result<()> {
        let store = setup_test_store().await?;

        assert_eq!(get_value(&*store, "greeting").await?, None);

        set_value(&*store, "greeting", "hello".to_string()).await?;
        assert_eq!(get_value(&*store, "greeting").await?.unwrap(), "hello");

        set_value(&*store, "greeting", "bonjour".to_string()).await?;
        assert_eq!(get_value(&*store, "greeting").await?.unwrap(), "bonjour");
        assert_eq!(SystemState::find().all(&*store).await?.len(), 1);

        Ok(())
    }
}
