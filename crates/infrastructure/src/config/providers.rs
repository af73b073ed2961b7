//! Geocoding and routing provider settings.

use std::time::Duration;

use application::services::{GeocodingServiceConfig, RateLimiterConfig};
use integration_maps::{GeocodingConfig, RoutingConfig};
use serde::{Deserialize, Serialize};

use crate::adapters::CircuitBreakerConfig;

/// Geocoding provider plus the service-level knobs around it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodingAppConfig {
    /// Provider connection settings
    #[serde(flatten)]
    pub provider: GeocodingConfig,

    /// Result cache lifetime in hours (default: 24)
    #[serde(default)]
    pub cache_ttl_hours: Option<u64>,

    /// Token bucket size per client (default: 30)
    #[serde(default)]
    pub rate_limit_capacity: Option<u32>,

    /// Seconds for an empty bucket to refill (default: 300)
    #[serde(default)]
    pub rate_limit_window_secs: Option<u64>,

    /// Minimum query length (default: 5)
    #[serde(default)]
    pub min_query_chars: Option<usize>,

    /// Maximum suggestions returned (default: 5)
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl GeocodingAppConfig {
    /// Settings for [`application::GeocodingService`]
    #[must_use]
    pub fn service_config(&self) -> GeocodingServiceConfig {
        let defaults = GeocodingServiceConfig::default();
        GeocodingServiceConfig {
            min_query_chars: self.min_query_chars.unwrap_or(defaults.min_query_chars),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            cache_ttl: self
                .cache_ttl_hours
                .map_or(defaults.cache_ttl, |h| Duration::from_secs(h * 3600)),
        }
    }

    /// Settings for the per-client token bucket
    #[must_use]
    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        let defaults = RateLimiterConfig::default();
        RateLimiterConfig {
            capacity: self.rate_limit_capacity.unwrap_or(defaults.capacity),
            window: self
                .rate_limit_window_secs
                .map_or(defaults.window, Duration::from_secs),
        }
    }
}

/// Routing provider plus cache and circuit breaker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingAppConfig {
    /// Provider connection settings; without an API key every estimate is haversine
    #[serde(flatten)]
    pub provider: RoutingConfig,

    /// Estimate cache lifetime in minutes (default: 10)
    #[serde(default)]
    pub cache_ttl_minutes: Option<u64>,

    /// Circuit breaker around provider calls
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

impl RoutingAppConfig {
    /// Cache TTL for distance estimates
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_minutes
            .map_or(application::ports::ttl::DISTANCE, |m| {
                Duration::from_secs(m * 60)
            })
    }
}
