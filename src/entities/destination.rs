//! Destination entity - A city/country pair that trips are planned against.
//!
//! The identifier is assigned by the remote mirror when the destination is
//! created, so it is never auto-incremented locally.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Destination database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "destinations")]
pub struct Model {
    /// Identifier shared with the remote mirror
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// City name (e.g., "Paris")
    pub city: String,
    /// Country name (e.g., "France")
    pub country: String,
    /// Raw image bytes, if an image was picked or downloaded
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    /// Hosted image URL as known to the remote mirror
    pub image_url: Option<String>,
}

/// Defines relationships between Destination and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One destination has many trips
    #[sea_orm(has_many = "super::trip::Entity")]
    Trips,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
