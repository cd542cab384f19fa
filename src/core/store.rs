//! The local store handle.

use crate::{
    config::database::{create_connection, create_tables},
    core::ids,
    entities::NumericId,
    errors::Result,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::{ops::Deref, sync::Arc};
use tracing::{info, instrument};

/// Owned handle to the on-device database.
///
/// Cloning is cheap (the connection is shared). The handle derefs to
/// [`DatabaseConnection`], so `&store` can be passed to every function in
/// [`crate::core`] that takes `db: &DatabaseConnection`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Arc<DatabaseConnection>,
}

impl LocalStore {
    /// Connects to `database_url` and makes sure every table exists.
    ///
    /// # Errors
    /// Fails if the database cannot be opened or the schema cannot be
    /// created. The binary treats this as fatal.
    #[instrument]
    pub async fn open(database_url: &str) -> Result<Self> {
        let db = create_connection(database_url).await?;
        create_tables(&db).await?;
        info!("Local store ready");
        Ok(Self::from_connection(db))
    }

    /// Wraps an existing connection. The schema is assumed to exist.
    #[must_use]
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Next free identifier for record kind `E`.
    pub async fn next_id<E: NumericId>(&self) -> Result<i64> {
        ids::next_id::<E, _>(self.connection()).await
    }

    /// Looks up a record of kind `E` by id.
    pub async fn find<E: NumericId>(&self, id: i64) -> Result<Option<E::Model>> {
        E::find()
            .filter(E::id_column().eq(id))
            .one(self.connection())
            .await
            .map_err(Into::into)
    }
}

impl Deref for LocalStore {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}
