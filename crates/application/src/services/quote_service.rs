//! Quote orchestrator
//!
//! Resolves distance and duration (caller-supplied or estimated), derives the
//! ride extras and prices the ride with the tariff engine.

use std::{fmt, sync::Arc};

use domain::{
    pricing,
    value_objects::{
        Coordinate, Quote, QuoteRequest, RideExtras, TariffConfig, minutes_at_fallback_speed,
    },
};
use tracing::{debug, instrument};

use crate::{error::ApplicationError, services::distance_estimator::DistanceEstimator};

/// Clamp a signed count to the unsigned range
fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// A caller-supplied measurement, if usable
fn supplied(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.max(0.0))
}

fn required_coordinate(
    coordinate: Option<Coordinate>,
    name: &str,
) -> Result<Coordinate, ApplicationError> {
    let coordinate = coordinate.ok_or_else(|| {
        ApplicationError::InvalidInput(format!("{name} coordinates are required"))
    })?;
    coordinate
        .validate()
        .map_err(|e| ApplicationError::InvalidInput(format!("{name}: {e}")))?;
    Ok(coordinate)
}

/// Service producing price quotes
#[derive(Clone)]
pub struct QuoteService {
    estimator: Arc<DistanceEstimator>,
}

impl fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteService")
            .field("estimator", &self.estimator)
            .finish()
    }
}

impl QuoteService {
    #[must_use]
    pub const fn new(estimator: Arc<DistanceEstimator>) -> Self {
        Self { estimator }
    }

    /// Ride extras after clamping negative counts to zero
    #[must_use]
    pub fn extras_for(req: &QuoteRequest) -> RideExtras {
        RideExtras {
            fifth_passenger: req.fifth_passenger_applies(),
            baggage_count: clamp_count(req.baggage_count),
            wait_minutes: clamp_count(req.wait_minutes),
        }
    }

    /// Price a ride
    ///
    /// A finite `distance_km` is used as given and no coordinates are needed;
    /// otherwise both coordinates are required and the distance is estimated.
    /// Coordinates that are present must be valid either way.
    #[instrument(skip(self, req, config), fields(tariff = %req.tariff))]
    pub async fn quote(
        &self,
        req: &QuoteRequest,
        config: &TariffConfig,
    ) -> Result<Quote, ApplicationError> {
        let supplied_distance = supplied(req.distance_km);
        let supplied_duration = supplied(req.duration_minutes);

        let (distance_km, estimated_duration, approximate) = match supplied_distance {
            Some(distance_km) => {
                for (coordinate, name) in [(req.pickup, "pickup"), (req.dropoff, "dropoff")] {
                    if coordinate.is_some() {
                        required_coordinate(coordinate, name)?;
                    }
                }
                (distance_km, None, false)
            },
            None => {
                let pickup = required_coordinate(req.pickup, "pickup")?;
                let dropoff = required_coordinate(req.dropoff, "dropoff")?;
                let estimate = self.estimator.estimate(pickup, dropoff).await?;
                (
                    estimate.distance_km,
                    Some(estimate.duration_minutes),
                    estimate.approximate,
                )
            },
        };

        let (duration_minutes, approximate) = match (supplied_duration, estimated_duration) {
            (Some(minutes), _) | (None, Some(minutes)) => (minutes, approximate),
            (None, None) => (minutes_at_fallback_speed(distance_km), true),
        };

        let extras = Self::extras_for(req);
        let price = pricing::price(distance_km, req.tariff, &extras, config);

        debug!(distance_km, duration_minutes, price, ?extras, "Quote computed");

        Ok(Quote {
            distance_km,
            duration_minutes,
            price,
            tariff: req.tariff,
            approximate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        ports::{MockCachePort, MockRoutingPort, RouteSummary},
    };
    use domain::value_objects::{KmRates, TariffTier};

    fn config() -> TariffConfig {
        TariffConfig {
            base_charge_cents: 300,
            km_cents: KmRates {
                a: 100,
                b: 150,
                c: 200,
                d: 250,
            },
            wait_per_hour_cents: 3_000,
            baggage_fee_cents: 150,
            fifth_passenger_cents: 500,
        }
    }

    fn empty_cache() -> Arc<MockCachePort> {
        let mut cache = MockCachePort::new();
        cache.expect_get_bytes().returning(|_| Ok(None));
        cache.expect_set_bytes().returning(|_, _, _| Ok(()));
        Arc::new(cache)
    }

    fn haversine_only() -> QuoteService {
        QuoteService::new(Arc::new(DistanceEstimator::new(empty_cache())))
    }

    #[tokio::test]
    async fn negative_extras_are_clamped_and_haversine_used() {
        let svc = haversine_only();
        let req = QuoteRequest {
            pickup: Some(Coordinate::new_unchecked(45.0, 5.0)),
            dropoff: Some(Coordinate::new_unchecked(46.0, 7.0)),
            tariff: TariffTier::A,
            passengers: -2,
            baggage_count: -3,
            wait_minutes: -1,
            ..QuoteRequest::default()
        };

        let extras = QuoteService::extras_for(&req);
        assert_eq!(extras, RideExtras::default());

        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!(quote.distance_km > 100.0);
        assert!(quote.approximate);
        let expected = pricing::price(quote.distance_km, TariffTier::A, &RideExtras::default(), &config());
        assert!((quote.price - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn five_passengers_force_fifth_passenger_fee() {
        let svc = haversine_only();
        let req = QuoteRequest {
            distance_km: Some(10.0),
            tariff: TariffTier::C,
            passengers: 5,
            baggage_count: 1,
            ..QuoteRequest::default()
        };

        let quote = svc.quote(&req, &config()).await.unwrap();
        // 3 + 10*2 + 1.5 + 5
        assert!((quote.price - 29.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn explicit_fifth_passenger_false_wins() {
        let svc = haversine_only();
        let req = QuoteRequest {
            distance_km: Some(10.0),
            tariff: TariffTier::C,
            passengers: 5,
            fifth_passenger: Some(false),
            ..QuoteRequest::default()
        };

        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!((quote.price - 23.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn supplied_distance_and_duration_are_used_verbatim() {
        let mut routing = MockRoutingPort::new();
        routing.expect_route().never();
        let estimator = DistanceEstimator::new(empty_cache()).with_routing(Arc::new(routing));
        let svc = QuoteService::new(Arc::new(estimator));

        let req = QuoteRequest {
            pickup: Some(Coordinate::new_unchecked(45.0, 5.0)),
            dropoff: Some(Coordinate::new_unchecked(46.0, 7.0)),
            distance_km: Some(42.42),
            duration_minutes: Some(37.0),
            ..QuoteRequest::default()
        };

        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!((quote.distance_km - 42.42).abs() < f64::EPSILON);
        assert!((quote.duration_minutes - 37.0).abs() < f64::EPSILON);
        assert!(!quote.approximate);
    }

    #[tokio::test]
    async fn missing_duration_derived_at_forty_kmh() {
        let svc = haversine_only();
        let req = QuoteRequest {
            distance_km: Some(20.0),
            ..QuoteRequest::default()
        };

        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!((quote.duration_minutes - 30.0).abs() < f64::EPSILON);
        assert!(quote.approximate);
    }

    #[tokio::test]
    async fn provider_duration_is_kept() {
        let mut routing = MockRoutingPort::new();
        routing.expect_route().returning(|_, _| {
            Ok(RouteSummary {
                distance_meters: 15_000.0,
                duration_seconds: 1_200.0,
            })
        });
        let estimator = DistanceEstimator::new(empty_cache()).with_routing(Arc::new(routing));
        let svc = QuoteService::new(Arc::new(estimator));

        let req = QuoteRequest::between(
            Coordinate::new_unchecked(45.75, 4.85),
            Coordinate::new_unchecked(45.72, 5.08),
            TariffTier::B,
        );
        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!((quote.distance_km - 15.0).abs() < f64::EPSILON);
        assert!((quote.duration_minutes - 20.0).abs() < f64::EPSILON);
        assert!(!quote.approximate);
        assert_eq!(quote.tariff, TariffTier::B);
    }

    #[tokio::test]
    async fn missing_coordinates_are_invalid_input() {
        let svc = haversine_only();
        let req = QuoteRequest {
            pickup: Some(Coordinate::new_unchecked(45.0, 5.0)),
            ..QuoteRequest::default()
        };
        let err = svc.quote(&req, &config()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("dropoff"));
    }

    #[tokio::test]
    async fn non_finite_coordinates_are_invalid_input() {
        let svc = haversine_only();
        let req = QuoteRequest::between(
            Coordinate::new_unchecked(f64::NAN, 5.0),
            Coordinate::new_unchecked(46.0, 7.0),
            TariffTier::A,
        );
        let err = svc.quote(&req, &config()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn invalid_coordinates_rejected_even_with_distance() {
        let svc = haversine_only();
        let req = QuoteRequest {
            pickup: Some(Coordinate::new_unchecked(200.0, 5.0)),
            distance_km: Some(5.0),
            ..QuoteRequest::default()
        };
        assert!(svc.quote(&req, &config()).await.is_err());
    }

    #[tokio::test]
    async fn non_finite_supplied_distance_is_ignored() {
        let svc = haversine_only();
        let req = QuoteRequest {
            pickup: Some(Coordinate::new_unchecked(45.0, 5.0)),
            dropoff: Some(Coordinate::new_unchecked(45.0, 5.0)),
            distance_km: Some(f64::INFINITY),
            ..QuoteRequest::default()
        };
        let quote = svc.quote(&req, &config()).await.unwrap();
        assert!(quote.distance_km.abs() < f64::EPSILON);
        assert!((quote.price - 3.0).abs() < 1e-9);
    }
}
