//! Core business logic - the local store and its record operations.
//!
//! Functions here never talk to the network. They validate input, enforce the
//! temporal and relationship guards, and read or write the `SQLite` store.
//! The sync layer calls them once a remote write has been acknowledged.

pub mod activity;
pub mod destination;
pub mod expense;
pub mod guards;
pub mod ids;
pub mod store;
pub mod system_state;
pub mod trip;

pub use store::LocalStore;

use crate::errors::{Error, Result};

/// Direction of a list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Ascending => Self::Asc,
            SortOrder::Descending => Self::Desc,
        }
    }
}

/// Filter and ordering for the `list_*` operations.
///
/// `search` is a case-insensitive substring match against the record's
/// display fields; `parent_id` restricts children to one parent (trips to a
/// destination, activities and expenses to a trip) and is ignored for
/// destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub parent_id: Option<i64>,
    pub order: SortOrder,
}

impl ListQuery {
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn within(parent_id: i64) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// True when no search term is set or any field contains it.
    pub(crate) fn matches(&self, fields: &[&str]) -> bool {
        self.search_term().is_none_or(|term| {
            fields
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
    }
}

/// Trims `value`, failing with `message` when nothing is left.
pub(crate) fn require_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(message));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_matching() {
        let query = ListQuery::search("  PAR ");
        assert!(query.matches(&["Paris", "France"]));
        assert!(query.matches(&["Lyon", "Spain", "parma"]));
        assert!(!query.matches(&["Rome", "Italy"]));

        let everything = ListQuery::default();
        assert!(everything.matches(&["anything"]));
        assert!(ListQuery::search("   ").matches(&["Rome"]));
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  Paris ", "missing").ok().as_deref(), Some("Paris"));
        assert!(matches!(
            require_text(" \t", "missing"),
            Err(Error::Validation { message }) if message == "missing"
        ));
    }
}
