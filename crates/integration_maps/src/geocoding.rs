//! Google Geocoding API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::GeocodingConfig;
use crate::error::MapsError;
use crate::models::{GeocodeResponse, GeocodeResult, GeocodeStatus};

/// Trait for forward geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Resolve free text to raw provider results
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, MapsError>;
}

/// Geocoding client for `GET {base_url}/json`
#[derive(Debug)]
pub struct GoogleGeocodingClient {
    client: Client,
    config: GeocodingConfig,
}

impl GoogleGeocodingClient {
    /// Create a new geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &GeocodingConfig) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("TaxiFare/1.0")
            .build()
            .map_err(|e| MapsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn parse_response(body: &str) -> Result<Vec<GeocodeResult>, MapsError> {
        let raw: GeocodeResponse =
            serde_json::from_str(body).map_err(|e| MapsError::ParseError(e.to_string()))?;
        let detail = raw.error_message.unwrap_or_default();

        match raw.status {
            GeocodeStatus::Ok => Ok(raw.results),
            GeocodeStatus::ZeroResults => Err(MapsError::ZeroResults),
            GeocodeStatus::InvalidRequest => Err(MapsError::InvalidRequest(detail)),
            GeocodeStatus::OverQueryLimit => Err(MapsError::QuotaExceeded),
            GeocodeStatus::RequestDenied => Err(MapsError::RequestDenied(detail)),
            GeocodeStatus::UnknownError | GeocodeStatus::Unrecognized => {
                Err(MapsError::ProviderStatus(if detail.is_empty() {
                    format!("{:?}", raw.status)
                } else {
                    detail
                }))
            },
        }
    }
}

#[async_trait]
impl GeocodingClient for GoogleGeocodingClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, MapsError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MapsError::NotConfigured("geocoding api_key".to_string()))?;

        let url = format!("{}/json", self.config.base_url.trim_end_matches('/'));
        let components = format!("country:{}", self.config.country);
        let params = [
            ("address", address),
            ("components", components.as_str()),
            ("language", self.config.language.as_str()),
            ("key", api_key),
        ];

        debug!(?url, "Geocoding address");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MapsError::from_reqwest(&e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "Geocoding request failed");
            return Err(MapsError::RequestFailed {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapsError::ParseError(e.to_string()))?;

        let results = Self::parse_response(&body)?;
        debug!(count = results.len(), "Geocoding results");
        Ok(results)
    }
}
