//! OpenRouteService directions client

use std::time::Duration;

use async_trait::async_trait;
use domain::Coordinate;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::RoutingConfig;
use crate::error::MapsError;
use crate::models::{DirectionsRequest, DirectionsResponse, RouteSummary};

/// Trait for road routing clients
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Distance and duration of the best driving route between two points
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteSummary, MapsError>;

    /// Whether the client has what it needs to issue requests
    fn is_configured(&self) -> bool;
}

/// OpenRouteService-backed routing client
#[derive(Debug)]
pub struct OpenRouteServiceClient {
    client: Client,
    config: RoutingConfig,
}

impl OpenRouteServiceClient {
    /// Create a new OpenRouteService client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &RoutingConfig) -> Result<Self, MapsError> {
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

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    fn parse_directions(body: &str) -> Result<RouteSummary, MapsError> {
        let raw: DirectionsResponse =
            serde_json::from_str(body).map_err(|e| MapsError::ParseError(e.to_string()))?;

        let route = raw.routes.into_iter().next().ok_or(MapsError::NoRoute)?;
        Ok(RouteSummary {
            distance_meters: route.summary.distance,
            duration_seconds: route.summary.duration,
        })
    }
}

#[async_trait]
impl RoutingClient for OpenRouteServiceClient {
    #[instrument(skip(self), fields(profile = %self.config.profile))]
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteSummary, MapsError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MapsError::NotConfigured("routing api_key".to_string()))?;

        let url = self.directions_url();
        let body = DirectionsRequest {
            coordinates: vec![[from.lng(), from.lat()], [to.lng(), to.lat()]],
        };

        debug!(?url, "Requesting directions");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MapsError::from_reqwest(&e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "Directions request failed");
            return Err(MapsError::RequestFailed {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MapsError::ParseError(e.to_string()))?;

        let summary = Self::parse_directions(&text)?;
        debug!(
            distance_m = summary.distance_meters,
            duration_s = summary.duration_seconds,
            "Route found"
        );
        Ok(summary)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
