//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod address_store;
mod cache_port;
mod featured_trip_store;
mod geocoding_port;
mod routing_port;
mod tariff_store;

#[cfg(test)]
pub use address_store::MockAddressStore;
pub use address_store::AddressStore;
#[cfg(test)]
pub use cache_port::MockCachePort;
pub use cache_port::{CachePort, CachePortExt, ttl};
#[cfg(test)]
pub use featured_trip_store::MockFeaturedTripStore;
pub use featured_trip_store::{FeaturedTripStore, PoiQuoteUpdate};
#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use geocoding_port::GeocodingPort;
#[cfg(test)]
pub use routing_port::MockRoutingPort;
pub use routing_port::{RouteSummary, RoutingPort};
#[cfg(test)]
pub use tariff_store::MockTariffConfigStore;
pub use tariff_store::TariffConfigStore;
