//! Geocoding adapter - implements `GeocodingPort` using `integration_maps`

use std::sync::Arc;

use application::{error::ApplicationError, ports::GeocodingPort};
use async_trait::async_trait;
use domain::{address_normalization::synthesize_label, value_objects::AddressCandidate};
use integration_maps::{
    GeocodeResult, GeocodingClient, GeocodingConfig, GoogleGeocodingClient, MapsError,
};
use tracing::{debug, instrument};

/// Locality component types, most specific first
const LOCALITY_TYPES: &[&str] = &[
    "locality",
    "postal_town",
    "sublocality",
    "administrative_area_level_3",
    "administrative_area_level_2",
];

/// Forward geocoding through a [`GeocodingClient`]
pub struct GeocodingAdapter {
    client: Arc<dyn GeocodingClient>,
}

impl std::fmt::Debug for GeocodingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingAdapter").finish_non_exhaustive()
    }
}

impl GeocodingAdapter {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Arc<dyn GeocodingClient>) -> Self {
        Self { client }
    }

    /// Build a Google-backed adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, ApplicationError> {
        let client = GoogleGeocodingClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(client)))
    }

    fn to_candidate(result: &GeocodeResult) -> AddressCandidate {
        let owned = |kind: &str| result.component(kind).map(|c| c.long_name.clone());

        let mut candidate = AddressCandidate {
            label: result.formatted_address.trim().to_string(),
            street: owned("route"),
            street_number: owned("street_number"),
            postcode: owned("postal_code"),
            city: result.first_long_name(LOCALITY_TYPES).map(str::to_string),
            country: owned("country"),
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
        };

        if candidate.label.is_empty() {
            candidate.label = synthesize_label(&candidate);
        }
        candidate
    }

    fn map_error(err: MapsError) -> ApplicationError {
        match err {
            MapsError::ZeroResults => ApplicationError::NotFound("no address matches".to_string()),
            MapsError::InvalidRequest(detail) => ApplicationError::InvalidInput(detail),
            MapsError::NotConfigured(what) => {
                ApplicationError::UpstreamUnavailable(format!("Geocoding provider unusable: {what}"))
            },
            other => ApplicationError::UpstreamUnavailable(format!("Geocoding failed: {other}")),
        }
    }
}

#[async_trait]
impl GeocodingPort for GeocodingAdapter {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<AddressCandidate>, ApplicationError> {
        let results = self.client.geocode(query).await.map_err(Self::map_error)?;
        debug!(count = results.len(), "Mapping geocoding results");
        Ok(results.iter().map(Self::to_candidate).collect())
    }
}
