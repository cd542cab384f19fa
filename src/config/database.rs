//! Database configuration for the local store.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs (foreign keys included) without hand-written SQL.

use crate::entities::{Activity, Destination, Expense, SystemState, Trip};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Default location of the local store when neither `travel.toml` nor
/// `DATABASE_URL` names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://travel_ledger.sqlite?mode=rwc";

/// Establishes a connection to the `SQLite` database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening local store");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables if they do not exist yet.
///
/// Parents are created before children so the foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Destination),
        schema.create_table_from_entity(Trip),
        schema.create_table_from_entity(Activity),
        schema.create_table_from_entity(Expense),
        schema.create_table_from_entity(SystemState),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    info!("Local store tables ensured");
    Ok(())
}
