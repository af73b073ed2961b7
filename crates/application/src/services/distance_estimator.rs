//! Distance estimator
//!
//! Road distance and duration between two coordinates. The routing provider is
//! preferred; whenever it is missing or fails, the estimator degrades to a
//! haversine approximation instead of returning an error.

use std::{fmt, sync::Arc, time::Duration};

use domain::value_objects::{Coordinate, RouteEstimate};
use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{CachePort, CachePortExt, RoutingPort, ttl},
};

/// Service computing route estimates with cache and fallback
pub struct DistanceEstimator {
    routing: Option<Arc<dyn RoutingPort>>,
    cache: Arc<dyn CachePort>,
    cache_ttl: Duration,
}

impl fmt::Debug for DistanceEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistanceEstimator")
            .field("has_routing", &self.routing.is_some())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

/// Directional cache key: `a->b` and `b->a` are different entries
fn cache_key(from: &Coordinate, to: &Coordinate) -> String {
    format!("distance:{}->{}", from.rounded_key(), to.rounded_key())
}

impl DistanceEstimator {
    /// Create an estimator without a routing provider (haversine only)
    #[must_use]
    pub fn new(cache: Arc<dyn CachePort>) -> Self {
        Self {
            routing: None,
            cache,
            cache_ttl: ttl::DISTANCE,
        }
    }

    /// Attach a routing provider
    #[must_use]
    pub fn with_routing(mut self, routing: Arc<dyn RoutingPort>) -> Self {
        self.routing = Some(routing);
        self
    }

    #[must_use]
    pub const fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Whether a routing provider is configured
    #[must_use]
    pub fn has_routing(&self) -> bool {
        self.routing.is_some()
    }

    /// Estimate distance (km) and duration (minutes) from `from` to `to`
    ///
    /// Only invalid coordinates produce an error; provider problems are
    /// absorbed into an `approximate` result.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn estimate(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteEstimate, ApplicationError> {
        from.validate()?;
        to.validate()?;

        let key = cache_key(&from, &to);
        match self.cache.get::<RouteEstimate>(&key).await {
            Ok(Some(cached)) => {
                debug!(%key, approximate = cached.approximate, "Distance cache hit");
                return Ok(cached);
            },
            Ok(None) => {},
            Err(e) => warn!(error = %e, %key, "Distance cache read failed, treating as miss"),
        }

        let estimate = self
            .provider_estimate(from, to)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Routing provider unusable, using haversine estimate");
                RouteEstimate::haversine(&from, &to)
            });

        if let Err(e) = self.cache.set(&key, &estimate, self.cache_ttl).await {
            warn!(error = %e, %key, "Failed to cache distance estimate");
        }

        Ok(estimate)
    }

    /// Provider-backed estimate, or the reason it could not be obtained
    async fn provider_estimate(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteEstimate, ApplicationError> {
        let routing = self.routing.as_ref().ok_or_else(|| {
            ApplicationError::UpstreamUnavailable("routing provider not configured".to_string())
        })?;

        let summary = routing.route(from, to).await?;
        if !summary.is_usable() {
            return Err(ApplicationError::UpstreamUnavailable(format!(
                "unusable route summary: {summary:?}"
            )));
        }

        Ok(RouteEstimate::from_provider(
            summary.distance_meters,
            summary.duration_seconds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockCachePort, MockRoutingPort, RouteSummary};

    fn lyon() -> Coordinate {
        Coordinate::new_unchecked(45.764, 4.8357)
    }

    fn grenoble() -> Coordinate {
        Coordinate::new_unchecked(45.1885, 5.7245)
    }

    fn empty_cache() -> MockCachePort {
        let mut cache = MockCachePort::new();
        cache.expect_get_bytes().returning(|_| Ok(None));
        cache.expect_set_bytes().returning(|_, _, _| Ok(()));
        cache
    }

    #[tokio::test]
    async fn uses_provider_summary() {
        let mut routing = MockRoutingPort::new();
        routing.expect_route().times(1).returning(|_, _| {
            Ok(RouteSummary {
                distance_meters: 104_512.0,
                duration_seconds: 4_470.0,
            })
        });

        let estimator =
            DistanceEstimator::new(Arc::new(empty_cache())).with_routing(Arc::new(routing));
        let estimate = estimator.estimate(lyon(), grenoble()).await.unwrap();

        assert!((estimate.distance_km - 104.51).abs() < 1e-9);
        assert!((estimate.duration_minutes - 75.0).abs() < 1e-9);
        assert!(!estimate.approximate);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_silently() {
        let mut routing = MockRoutingPort::new();
        routing
            .expect_route()
            .returning(|_, _| Err(ApplicationError::UpstreamUnavailable("timeout".into())));

        let estimator =
            DistanceEstimator::new(Arc::new(empty_cache())).with_routing(Arc::new(routing));
        let estimate = estimator.estimate(lyon(), grenoble()).await.unwrap();

        assert!(estimate.approximate);
        let expected = RouteEstimate::haversine(&lyon(), &grenoble());
        assert_eq!(estimate, expected);
    }

    #[tokio::test]
    async fn malformed_summary_falls_back() {
        let mut routing = MockRoutingPort::new();
        routing.expect_route().returning(|_, _| {
            Ok(RouteSummary {
                distance_meters: f64::NAN,
                duration_seconds: 10.0,
            })
        });

        let estimator =
            DistanceEstimator::new(Arc::new(empty_cache())).with_routing(Arc::new(routing));
        assert!(estimator.estimate(lyon(), grenoble()).await.unwrap().approximate);
    }

    #[tokio::test]
    async fn unconfigured_provider_uses_haversine() {
        let estimator = DistanceEstimator::new(Arc::new(empty_cache()));
        let estimate = estimator.estimate(lyon(), grenoble()).await.unwrap();
        assert!(estimate.approximate);
        // Duration at 40 km/h
        let expected_minutes = (estimate.distance_km / 40.0 * 60.0).round();
        assert!((estimate.duration_minutes - expected_minutes).abs() < 1e-9);
    }

    #[tokio::test]
    async fn cache_hit_skips_provider() {
        let cached = RouteEstimate {
            distance_km: 12.0,
            duration_minutes: 20.0,
            approximate: false,
        };
        let bytes = serde_json::to_vec(&cached).unwrap();
        let mut cache = MockCachePort::new();
        cache
            .expect_get_bytes()
            .withf(|key| key == "distance:45.764000,4.835700->45.188500,5.724500")
            .returning(move |_| Ok(Some(bytes.clone())));
        cache.expect_set_bytes().never();

        let mut routing = MockRoutingPort::new();
        routing.expect_route().never();

        let estimator = DistanceEstimator::new(Arc::new(cache)).with_routing(Arc::new(routing));
        assert_eq!(estimator.estimate(lyon(), grenoble()).await.unwrap(), cached);
    }

    #[tokio::test]
    async fn fallback_result_is_cached_with_distance_ttl() {
        let mut cache = MockCachePort::new();
        cache.expect_get_bytes().returning(|_| Ok(None));
        cache
            .expect_set_bytes()
            .withf(|key, _, entry_ttl| key.starts_with("distance:") && *entry_ttl == ttl::DISTANCE)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let estimator = DistanceEstimator::new(Arc::new(cache));
        estimator.estimate(lyon(), grenoble()).await.unwrap();
    }

    #[tokio::test]
    async fn cache_failures_do_not_fail_estimate() {
        let mut cache = MockCachePort::new();
        cache
            .expect_get_bytes()
            .returning(|_| Err(ApplicationError::Internal("down".into())));
        cache
            .expect_set_bytes()
            .returning(|_, _, _| Err(ApplicationError::Internal("down".into())));

        let estimator = DistanceEstimator::new(Arc::new(cache));
        assert!(estimator.estimate(lyon(), grenoble()).await.is_ok());
    }

    #[tokio::test]
    async fn non_finite_coordinate_is_rejected() {
        let estimator = DistanceEstimator::new(Arc::new(empty_cache()));
        let err = estimator
            .estimate(Coordinate::new_unchecked(f64::NAN, 5.0), grenoble())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn cache_key_is_directional() {
        assert_ne!(cache_key(&lyon(), &grenoble()), cache_key(&grenoble(), &lyon()));
    }
}
