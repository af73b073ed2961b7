//! Routing adapter - implements `RoutingPort` using `integration_maps`

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{RouteSummary, RoutingPort},
};
use async_trait::async_trait;
use domain::value_objects::Coordinate;
use integration_maps::{MapsError, OpenRouteServiceClient, RoutingClient, RoutingConfig};
use tracing::{debug, instrument};

use super::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Road routing through a [`RoutingClient`], guarded by a circuit breaker
pub struct RoutingAdapter {
    client: Arc<dyn RoutingClient>,
    circuit_breaker: CircuitBreaker,
}

impl std::fmt::Debug for RoutingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingAdapter")
            .field("configured", &self.client.is_configured())
            .field("circuit_breaker", &self.circuit_breaker)
            .finish()
    }
}

impl RoutingAdapter {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Arc<dyn RoutingClient>, breaker: CircuitBreakerConfig) -> Self {
        Self {
            client,
            circuit_breaker: CircuitBreaker::with_config("routing", breaker),
        }
    }

    /// Build an OpenRouteService-backed adapter, or `None` when no API key is set
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn from_config(
        config: &RoutingConfig,
        breaker: CircuitBreakerConfig,
    ) -> Result<Option<Self>, ApplicationError> {
        if !config.is_configured() {
            debug!("Routing provider not configured, distances will use haversine");
            return Ok(None);
        }
        let client = OpenRouteServiceClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Some(Self::new(Arc::new(client), breaker)))
    }

    fn map_error(err: CircuitBreakerError<MapsError>) -> ApplicationError {
        match err {
            CircuitBreakerError::CircuitOpen { service_name } => ApplicationError::UpstreamUnavailable(
                format!("{service_name} circuit breaker is open"),
            ),
            CircuitBreakerError::ServiceError(MapsError::NotConfigured(what)) => {
                ApplicationError::Configuration(what)
            },
            CircuitBreakerError::ServiceError(e) => {
                ApplicationError::UpstreamUnavailable(format!("Routing failed: {e}"))
            },
        }
    }
}

#[async_trait]
impl RoutingPort for RoutingAdapter {
    #[instrument(skip(self))]
    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteSummary, ApplicationError> {
        let summary = self
            .circuit_breaker
            .call(|| self.client.route(from, to))
            .await
            .map_err(Self::map_error)?;

        Ok(RouteSummary {
            distance_meters: summary.distance_meters,
            duration_seconds: summary.duration_seconds,
        })
    }

    async fn is_available(&self) -> bool {
        self.client.is_configured() && !self.circuit_breaker.is_open()
    }
}
