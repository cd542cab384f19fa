//! Entity module - SeaORM entity definitions for the local store.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activity;
pub mod destination;
pub mod expense;
pub mod system_state;
pub mod trip;

use sea_orm::EntityTrait;

// Re-export specific types to avoid conflicts
pub use activity::{Column as ActivityColumn, Entity as Activity, Model as ActivityModel};
pub use destination::{
    Column as DestinationColumn, Entity as Destination, Model as DestinationModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use trip::{Column as TripColumn, Entity as Trip, Model as TripModel};

/// Entities keyed by a single integer `id` column.
///
/// Lets identifier allocation and lookups be written once for every record
/// kind instead of once per table.
pub trait NumericId: EntityTrait {
    /// The primary key column.
    fn id_column() -> Self::Column;
    /// Reads the identifier out of a model.
    fn id_of(model: &Self::Model) -> i64;
}

impl NumericId for Destination {
    fn id_column() -> Self::Column {
        DestinationColumn::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }
}

impl NumericId for Trip {
    fn id_column() -> Self::Column {
        TripColumn::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }
}

impl NumericId for Activity {
    fn id_column() -> Self::Column {
        ActivityColumn::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }
}

impl NumericId for Expense {
    fn id_column() -> Self::Column {
        ExpenseColumn::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }
}
