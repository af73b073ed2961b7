//! Value Objects - Immutable, identity-less domain primitives

mod address_candidate;
mod address_id;
mod coordinate;
mod featured_trip_id;
mod poi_id;
mod quote;
mod route_estimate;
mod tariff;

pub use address_candidate::AddressCandidate;
pub use address_id::AddressId;
pub use coordinate::{Coordinate, EARTH_RADIUS_KM};
pub use featured_trip_id::FeaturedTripId;
pub use poi_id::PoiId;
pub use quote::{FIFTH_PASSENGER_THRESHOLD, Quote, QuoteRequest};
pub use route_estimate::{FALLBACK_SPEED_KMH, RouteEstimate, minutes_at_fallback_speed, round2};
pub use tariff::{
    DAY_TIER_START_HOUR, KmRates, NIGHT_TIER_START_HOUR, RideExtras, TariffConfig, TariffSnapshot,
    TariffTier,
};
