//! Routing provider port
//!
//! Road distance and travel time between two points.

use async_trait::async_trait;
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Raw route summary as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    /// Route length in meters
    pub distance_meters: f64,
    /// Travel time in seconds
    pub duration_seconds: f64,
}

impl RouteSummary {
    /// Both values finite and non-negative
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.distance_meters.is_finite()
            && self.duration_seconds.is_finite()
            && self.distance_meters >= 0.0
            && self.duration_seconds >= 0.0
    }
}

/// Port for routing operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoutingPort: Send + Sync {
    /// Driving route summary from `from` to `to`
    ///
    /// Any provider problem (timeout, HTTP error, missing summary) is an
    /// `UpstreamUnavailable` error.
    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteSummary, ApplicationError>;

    /// Check if the routing provider is reachable
    async fn is_available(&self) -> bool;
}
