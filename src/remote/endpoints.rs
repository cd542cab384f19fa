//! Resource paths below the mirror's base URL.

use crate::config::settings::RemoteSettings;

/// Builds collection and item paths from the configured segment names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    destinations: String,
    trips: String,
    activities: String,
    expenses: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_settings(&RemoteSettings::default())
    }
}

impl Endpoints {
    #[must_use]
    pub fn from_settings(settings: &RemoteSettings) -> Self {
        let segment = |s: &str| s.trim_matches('/').to_string();
        Self {
            destinations: segment(&settings.destinations_segment),
            trips: segment(&settings.trips_segment),
            activities: segment(&settings.activities_segment),
            expenses: segment(&settings.expenses_segment),
        }
    }

    #[must_use]
    pub fn destinations(&self) -> String {
        format!("/{}", self.destinations)
    }

    #[must_use]
    pub fn destination(&self, destination_id: i64) -> String {
        format!("/{}/{destination_id}", self.destinations)
    }

    /// Trips are nested under their destination.
    #[must_use]
    pub fn trips(&self, destination_id: i64) -> String {
        format!("/{}/{destination_id}/{}", self.destinations, self.trips)
    }

    #[must_use]
    pub fn trip(&self, destination_id: i64, trip_id: i64) -> String {
        format!(
            "/{}/{destination_id}/{}/{trip_id}",
            self.destinations, self.trips
        )
    }

    #[must_use]
    pub fn activities(&self) -> String {
        format!("/{}", self.activities)
    }

    #[must_use]
    pub fn activity(&self, activity_id: i64) -> String {
        format!("/{}/{activity_id}", self.activities)
    }

    #[must_use]
    pub fn expenses(&self) -> String {
        format!("/{}", self.expenses)
    }

    #[must_use]
    pub fn expense(&self, expense_id: i64) -> String {
        format!("/{}/{expense_id}", self.expenses)
    }
}
