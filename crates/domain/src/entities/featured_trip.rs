//! Featured trip entity - admin-curated marketing routes with precomputed prices

use serde::{Deserialize, Serialize};

use crate::value_objects::{AddressId, FeaturedTripId, PoiId};

/// A destination of a featured trip
///
/// `distance_km`, `duration_minutes` and `price_cents` are derived fields,
/// overwritten by every price refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedPoi {
    pub id: PoiId,
    pub label: String,
    pub dropoff_address_id: Option<AddressId>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub price_cents: Option<i64>,
}

impl FeaturedPoi {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: PoiId::new(),
            label: label.into(),
            dropoff_address_id: None,
            distance_km: None,
            duration_minutes: None,
            price_cents: None,
        }
    }
}

/// A pickup point with a list of destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedTrip {
    pub id: FeaturedTripId,
    pub pickup_label: String,
    pub pickup_address_id: Option<AddressId>,
    pub poi_destinations: Vec<FeaturedPoi>,
    /// Display price, copied from the first destination
    pub summary_price_cents: Option<i64>,
    pub published: bool,
}

impl FeaturedTrip {
    #[must_use]
    pub fn new(pickup_label: impl Into<String>) -> Self {
        Self {
            id: FeaturedTripId::new(),
            pickup_label: pickup_label.into(),
            pickup_address_id: None,
            poi_destinations: Vec::new(),
            summary_price_cents: None,
            published: true,
        }
    }

    /// Builder-style helper to append a destination
    #[must_use]
    pub fn with_poi(mut self, poi: FeaturedPoi) -> Self {
        self.poi_destinations.push(poi);
        self
    }
}

/// Progress of one trip through a price refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripRefreshStage {
    /// Pickup or drop-off coordinates not resolved yet
    PendingAddress,
    /// All coordinates known
    AddressResolved,
    /// Every destination has a fresh quote
    Quoted,
    /// Quotes written back
    Persisted,
    /// Refresh abandoned; previously stored values are kept
    Errored,
}

impl TripRefreshStage {
    /// Next stage on success. `Persisted` and `Errored` are terminal.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::PendingAddress => Self::AddressResolved,
            Self::AddressResolved => Self::Quoted,
            Self::Quoted | Self::Persisted => Self::Persisted,
            Self::Errored => Self::Errored,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Errored)
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PendingAddress => "pending address",
            Self::AddressResolved => "address resolved",
            Self::Quoted => "quoted",
            Self::Persisted => "persisted",
            Self::Errored => "errored",
        }
    }
}

impl std::fmt::Display for TripRefreshStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trip_is_published_without_destinations() {
        let trip = FeaturedTrip::new("Gare Part-Dieu");
        assert!(trip.published);
        assert!(trip.poi_destinations.is_empty());
        assert!(trip.pickup_address_id.is_none());
    }

    #[test]
    fn with_poi_appends_in_order() {
        let trip = FeaturedTrip::new("Lyon")
            .with_poi(FeaturedPoi::new("Aéroport Saint-Exupéry"))
            .with_poi(FeaturedPoi::new("Annecy"));
        let labels: Vec<_> = trip.poi_destinations.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Aéroport Saint-Exupéry", "Annecy"]);
    }

    #[test]
    fn stages_advance_to_persisted() {
        let mut stage = TripRefreshStage::PendingAddress;
        let mut seen = vec![stage];
        while !stage.is_terminal() {
            stage = stage.advance();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            [
                TripRefreshStage::PendingAddress,
                TripRefreshStage::AddressResolved,
                TripRefreshStage::Quoted,
                TripRefreshStage::Persisted,
            ]
        );
    }

    #[test]
    fn errored_is_absorbing() {
        assert_eq!(TripRefreshStage::Errored.advance(), TripRefreshStage::Errored);
        assert!(TripRefreshStage::Errored.is_terminal());
    }
}
