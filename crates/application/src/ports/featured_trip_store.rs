//! Featured trip storage port
//!
//! Every method is a single-row upsert; no operation spans more than one trip.

use async_trait::async_trait;
use domain::{
    entities::FeaturedTrip,
    value_objects::{AddressId, FeaturedTripId, PoiId},
};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Derived values written onto a destination by a price refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoiQuoteUpdate {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub price_cents: i64,
}

/// Port for featured trip persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeaturedTripStore: Send + Sync {
    /// All published trips with their destinations, in display order
    async fn list_published(&self) -> Result<Vec<FeaturedTrip>, ApplicationError>;

    /// Get a trip by ID
    async fn get(&self, id: FeaturedTripId) -> Result<Option<FeaturedTrip>, ApplicationError>;

    /// Insert or replace a trip and its destinations
    async fn upsert(&self, trip: &FeaturedTrip) -> Result<(), ApplicationError>;

    /// Link the trip's pickup to an address record
    async fn set_pickup_address(
        &self,
        trip_id: FeaturedTripId,
        address_id: AddressId,
    ) -> Result<(), ApplicationError>;

    /// Link a destination to its drop-off address record
    async fn set_poi_dropoff_address(
        &self,
        poi_id: PoiId,
        address_id: AddressId,
    ) -> Result<(), ApplicationError>;

    /// Overwrite the derived distance, duration and price of a destination
    async fn update_poi_quote(
        &self,
        poi_id: PoiId,
        update: PoiQuoteUpdate,
    ) -> Result<(), ApplicationError>;

    /// Overwrite the trip's display price
    async fn update_trip_summary_price(
        &self,
        trip_id: FeaturedTripId,
        price_cents: i64,
    ) -> Result<(), ApplicationError>;
}
