//! Quote request and result

use serde::{Deserialize, Serialize};

use super::{coordinate::Coordinate, tariff::TariffTier};

/// Passenger count above which the fifth-passenger surcharge applies by default
pub const FIFTH_PASSENGER_THRESHOLD: i64 = 4;

/// Everything needed to price a ride
///
/// Counts are signed so that callers can pass raw user input; they are
/// clamped to zero when the quote is computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub pickup: Option<Coordinate>,
    pub dropoff: Option<Coordinate>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub tariff: TariffTier,
    pub passengers: i64,
    pub baggage_count: i64,
    pub wait_minutes: i64,
    /// Explicit override; when absent it is derived from `passengers`
    pub fifth_passenger: Option<bool>,
}

impl QuoteRequest {
    /// Request between two points with no extras
    #[must_use]
    pub fn between(pickup: Coordinate, dropoff: Coordinate, tariff: TariffTier) -> Self {
        Self {
            pickup: Some(pickup),
            dropoff: Some(dropoff),
            tariff,
            ..Self::default()
        }
    }

    /// Whether the fifth-passenger surcharge applies
    ///
    /// An explicit value always wins over the passenger count.
    #[must_use]
    pub fn fifth_passenger_applies(&self) -> bool {
        self.fifth_passenger
            .unwrap_or(self.passengers > FIFTH_PASSENGER_THRESHOLD)
    }
}

/// A computed price quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub distance_km: f64,
    pub duration_minutes: f64,
    /// Price in euros, rounded to cents
    pub price: f64,
    pub tariff: TariffTier,
    /// True when distance or duration came from the fallback estimate
    pub approximate: bool,
}

impl Quote {
    /// Price converted to whole cents
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn price_cents(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_passenger_derived_from_count() {
        let mut req = QuoteRequest {
            passengers: 5,
            ..QuoteRequest::default()
        };
        assert!(req.fifth_passenger_applies());
        req.passengers = 4;
        assert!(!req.fifth_passenger_applies());
    }

    #[test]
    fn explicit_fifth_passenger_wins() {
        let req = QuoteRequest {
            passengers: 6,
            fifth_passenger: Some(false),
            ..QuoteRequest::default()
        };
        assert!(!req.fifth_passenger_applies());

        let req = QuoteRequest {
            passengers: 1,
            fifth_passenger: Some(true),
            ..QuoteRequest::default()
        };
        assert!(req.fifth_passenger_applies());
    }

    #[test]
    fn deserializes_partial_camel_case_body() {
        let req: QuoteRequest = serde_json::from_str(
            r#"{"pickup":{"lat":45.0,"lng":5.0},"distanceKm":12.5,"tariff":"C","baggageCount":2}"#,
        )
        .unwrap();
        assert_eq!(req.tariff, TariffTier::C);
        assert_eq!(req.baggage_count, 2);
        assert!(req.dropoff.is_none());
        assert_eq!(req.distance_km, Some(12.5));
    }

    #[test]
    fn price_cents_rounds() {
        let quote = Quote {
            distance_km: 1.0,
            duration_minutes: 2.0,
            price: 12.35,
            tariff: TariffTier::A,
            approximate: false,
        };
        assert_eq!(quote.price_cents(), 1235);
    }
}
