//! Application services - fare pipeline use cases

pub mod distance_estimator;
pub mod featured_trip_refresher;
pub mod geocoding_service;
pub mod quote_service;
pub mod rate_limiter;
pub mod tariff_service;

pub use distance_estimator::DistanceEstimator;
pub use featured_trip_refresher::{
    FeaturedTripRefresher, RefreshReport, RefresherConfig, TripFailure,
};
pub use geocoding_service::{GeocodingService, GeocodingServiceConfig};
pub use quote_service::QuoteService;
pub use rate_limiter::{RateLimiterConfig, TokenBucketLimiter};
pub use tariff_service::{TariffService, TariffUpdate};
