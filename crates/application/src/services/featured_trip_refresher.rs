//! Featured-trip price refresher
//!
//! Batch reconciliation run after every tariff change. Each published trip is
//! processed on its own: its addresses are geocoded when needed, every
//! destination is re-quoted and the results are written back. A failing trip
//! is reported and skipped; it keeps its previous values until the next run.

use std::{fmt, sync::Arc};

use domain::{
    entities::{Address, FeaturedTrip, TripRefreshStage},
    value_objects::{AddressId, Coordinate, FeaturedTripId, QuoteRequest, TariffConfig, TariffTier},
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{AddressStore, FeaturedTripStore, PoiQuoteUpdate},
    services::{geocoding_service::GeocodingService, quote_service::QuoteService},
};

/// Configuration for the refresher
#[derive(Debug, Clone, Copy)]
pub struct RefresherConfig {
    /// Tier used to price featured trips (default: A)
    pub tier: TariffTier,
    /// Trips processed concurrently (default: 1, sequential)
    pub workers: usize,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            tier: TariffTier::A,
            workers: 1,
        }
    }
}

/// Why a single trip could not be refreshed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripFailure {
    pub trip_id: FeaturedTripId,
    /// Last stage reached before the error
    pub failed_at: TripRefreshStage,
    pub reason: String,
}

/// Outcome of a refresh pass, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub succeeded: Vec<FeaturedTripId>,
    pub failed: Vec<TripFailure>,
}

impl RefreshReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Recomputes and persists featured trip prices
pub struct FeaturedTripRefresher {
    trips: Arc<dyn FeaturedTripStore>,
    addresses: Arc<dyn AddressStore>,
    geocoder: Arc<GeocodingService>,
    quotes: QuoteService,
    config: RefresherConfig,
}

impl fmt::Debug for FeaturedTripRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeaturedTripRefresher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FeaturedTripRefresher {
    #[must_use]
    pub fn new(
        trips: Arc<dyn FeaturedTripStore>,
        addresses: Arc<dyn AddressStore>,
        geocoder: Arc<GeocodingService>,
        quotes: QuoteService,
        config: RefresherConfig,
    ) -> Self {
        Self {
            trips,
            addresses,
            geocoder,
            quotes,
            config,
        }
    }

    /// Refresh every published trip with the given tariff
    ///
    /// Fails only if the trip list itself cannot be loaded.
    #[instrument(skip(self, tariff))]
    pub async fn refresh_all(&self, tariff: &TariffConfig) -> Result<RefreshReport, ApplicationError> {
        let trips = self.trips.list_published().await?;
        info!(trips = trips.len(), workers = self.config.workers, "Refreshing featured trip prices");

        let outcomes: Vec<Result<FeaturedTripId, TripFailure>> = stream::iter(trips)
            .map(|trip| async move { self.refresh_trip(&trip, tariff).await })
            .buffered(self.config.workers.max(1))
            .collect()
            .await;

        let mut report = RefreshReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(id) => report.succeeded.push(id),
                Err(failure) => {
                    warn!(
                        trip_id = %failure.trip_id,
                        stage = %failure.failed_at,
                        reason = %failure.reason,
                        "Featured trip refresh failed, keeping previous prices"
                    );
                    report.failed.push(failure);
                },
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Featured trip refresh finished"
        );
        Ok(report)
    }

    /// Refresh a single trip
    pub async fn refresh_trip(
        &self,
        trip: &FeaturedTrip,
        tariff: &TariffConfig,
    ) -> Result<FeaturedTripId, TripFailure> {
        let mut stage = TripRefreshStage::PendingAddress;
        match self.run_stages(trip, tariff, &mut stage).await {
            Ok(()) => {
                debug!(trip_id = %trip.id, %stage, "Featured trip refreshed");
                Ok(trip.id)
            },
            Err(e) => Err(TripFailure {
                trip_id: trip.id,
                failed_at: stage,
                reason: e.to_string(),
            }),
        }
    }

    async fn run_stages(
        &self,
        trip: &FeaturedTrip,
        tariff: &TariffConfig,
        stage: &mut TripRefreshStage,
    ) -> Result<(), ApplicationError> {
        let (pickup_id, pickup) = self
            .resolve_address(trip.pickup_address_id, &trip.pickup_label)
            .await?;
        if trip.pickup_address_id != Some(pickup_id) {
            self.trips.set_pickup_address(trip.id, pickup_id).await?;
        }

        let mut dropoffs = Vec::with_capacity(trip.poi_destinations.len());
        for poi in &trip.poi_destinations {
            let (address_id, dropoff) = self
                .resolve_address(poi.dropoff_address_id, &poi.label)
                .await?;
            if poi.dropoff_address_id != Some(address_id) {
                self.trips.set_poi_dropoff_address(poi.id, address_id).await?;
            }
            dropoffs.push((poi.id, dropoff));
        }
        *stage = stage.advance();

        let mut updates = Vec::with_capacity(dropoffs.len());
        for (poi_id, dropoff) in dropoffs {
            let request = QuoteRequest::between(pickup, dropoff, self.config.tier);
            let quote = self.quotes.quote(&request, tariff).await?;
            updates.push((
                poi_id,
                PoiQuoteUpdate {
                    distance_km: quote.distance_km,
                    duration_minutes: quote.duration_minutes,
                    price_cents: quote.price_cents(),
                },
            ));
        }
        *stage = stage.advance();

        for (poi_id, update) in &updates {
            self.trips.update_poi_quote(*poi_id, *update).await?;
        }
        if let Some((_, first)) = updates.first() {
            self.trips
                .update_trip_summary_price(trip.id, first.price_cents)
                .await?;
        }
        *stage = stage.advance();

        Ok(())
    }

    /// Coordinates for a label, reusing the linked address when it has them
    async fn resolve_address(
        &self,
        linked: Option<AddressId>,
        label: &str,
    ) -> Result<(AddressId, Coordinate), ApplicationError> {
        let existing = match linked {
            Some(id) => self.addresses.get(id).await?,
            None => None,
        };

        if let Some(address) = &existing {
            if let Some(coordinate) = address.known_coordinate() {
                return Ok((address.id, coordinate));
            }
        }

        let candidate = self
            .geocoder
            .geocode_internal(label)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApplicationError::NotFound(format!("no address for '{label}'")))?;
        let coordinate = candidate.coordinate();
        coordinate.validate()?;

        if let Some(address) = existing {
            self.addresses
                .update_coordinates(address.id, coordinate)
                .await?;
            debug!(address_id = %address.id, "Updated address coordinates");
            Ok((address.id, coordinate))
        } else {
            let created = self
                .addresses
                .create(&Address::from_candidate(&candidate))
                .await?;
            debug!(address_id = %created.id, "Created address from geocoding result");
            Ok((created.id, coordinate))
        }
    }
}
