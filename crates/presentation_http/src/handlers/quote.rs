//! Fare quote handler

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domain::{Coordinate, Quote, QuoteRequest, TariffTier};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, middleware::JsonBody, state::AppState};

/// Quote request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    pub pickup: Option<Coordinate>,
    pub dropoff: Option<Coordinate>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    /// Explicit tier; wins over `pickup_at`
    pub tariff: Option<TariffTier>,
    /// Pickup time used to pick the tier when `tariff` is absent
    pub pickup_at: Option<DateTime<Utc>>,
    pub passengers: Option<i64>,
    pub baggage_count: Option<i64>,
    pub wait_minutes: Option<i64>,
    pub fifth_passenger: Option<bool>,
}

impl QuoteBody {
    /// Build the domain request, selecting the tier in `tz`
    pub fn into_request(self, tz: Tz) -> QuoteRequest {
        let tariff = self
            .tariff
            .or_else(|| self.pickup_at.map(|at| TariffTier::for_instant(at, tz)))
            .unwrap_or_default();

        QuoteRequest {
            pickup: self.pickup,
            dropoff: self.dropoff,
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            tariff,
            passengers: self.passengers.unwrap_or(1),
            baggage_count: self.baggage_count.unwrap_or(0),
            wait_minutes: self.wait_minutes.unwrap_or(0),
            fifth_passenger: self.fifth_passenger,
        }
    }
}

/// `POST /v1/quote`
#[instrument(skip(state, body))]
pub async fn quote(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<QuoteBody>,
) -> Result<Json<Quote>, ApiError> {
    let request = body.into_request(state.services.timezone);
    let tariff = state.services.tariffs.current().await?;
    let quote = state.services.quotes.quote(&request, &tariff.config).await?;
    Ok(Json(quote))
}
