//! Distance/duration estimate between two coordinates

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// Average speed used when no routing provider duration is available
pub const FALLBACK_SPEED_KMH: f64 = 40.0;

/// Round to two decimals
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Travel time in minutes at [`FALLBACK_SPEED_KMH`]
#[must_use]
pub fn minutes_at_fallback_speed(distance_km: f64) -> f64 {
    (distance_km / FALLBACK_SPEED_KMH * 60.0).round()
}

/// Result of a distance estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_minutes: f64,
    /// True when the value did not come from the routing provider
    pub approximate: bool,
}

impl RouteEstimate {
    /// Build from a routing provider summary (meters and seconds)
    #[must_use]
    pub fn from_provider(distance_m: f64, duration_s: f64) -> Self {
        Self {
            distance_km: round2(distance_m / 1000.0),
            duration_minutes: (duration_s / 60.0).round(),
            approximate: false,
        }
    }

    /// Great-circle approximation used when the provider is not usable
    #[must_use]
    pub fn haversine(from: &Coordinate, to: &Coordinate) -> Self {
        let distance_km = round2(from.haversine_km(to));
        Self {
            distance_km,
            duration_minutes: minutes_at_fallback_speed(distance_km),
            approximate: true,
        }
    }
}
