//! Trip entity - A dated journey to one destination.
//!
//! Trips own activities and expenses; a trip with either cannot be deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trip database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    /// Client-assigned identifier (`max + 1`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// ID of the destination this trip goes to
    pub destination_id: i64,
    /// Human-readable title
    pub title: String,
    /// When the trip starts
    pub start_date: DateTimeUtc,
    /// When the trip ends
    pub end_date: DateTimeUtc,
}

/// Defines relationships between Trip and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each trip belongs to one destination
    #[sea_orm(
        belongs_to = "super::destination::Entity",
        from = "Column::DestinationId",
        to = "super::destination::Column::Id"
    )]
    Destination,
    /// One trip has many activities
    #[sea_orm(has_many = "super::activity::Entity")]
    Activities,
    /// One trip has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::destination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Destination.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
