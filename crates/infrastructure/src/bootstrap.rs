//! Service wiring shared by the server and the CLI

use std::sync::Arc;

use application::{
    DistanceEstimator, FeaturedTripRefresher, GeocodingService, QuoteService, TariffService,
    TokenBucketLimiter,
    error::ApplicationError,
    ports::{AddressStore, CachePort, FeaturedTripStore, RoutingPort, TariffConfigStore},
};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::info;

use crate::{
    adapters::{GeocodingAdapter, RoutingAdapter},
    cache::MokaCache,
    config::AppConfig,
    persistence::{
        ConnectionPool, DatabaseError, SqliteAddressStore, SqliteFeaturedTripStore,
        SqliteTariffStore, create_pool,
    },
};

/// Errors raised while assembling the services
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Database could not be opened or migrated
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Provider client could not be built
    #[error(transparent)]
    Provider(#[from] ApplicationError),
}

/// Every service of the quoting pipeline, wired to its adapters
#[derive(Clone)]
pub struct Services {
    /// Database pool
    pub pool: Arc<ConnectionPool>,
    /// Shared cache
    pub cache: Arc<dyn CachePort>,
    /// Per-client geocoding limiter
    pub limiter: Arc<TokenBucketLimiter>,
    /// Distance estimator
    pub estimator: Arc<DistanceEstimator>,
    /// Geocoder
    pub geocoding: Arc<GeocodingService>,
    /// Quote orchestrator
    pub quotes: QuoteService,
    /// Featured-trip refresher
    pub refresher: Arc<FeaturedTripRefresher>,
    /// Tariff use cases
    pub tariffs: Arc<TariffService>,
    /// Featured trip persistence, for seeding and inspection
    pub trips: Arc<dyn FeaturedTripStore>,
    /// Timezone used for tier selection
    pub timezone: Tz,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("estimator", &self.estimator)
            .field("refresher", &self.refresher)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Validate the configuration and build all services
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, an unusable database or
    /// a provider client that cannot be initialized.
    pub fn build(config: &AppConfig) -> Result<Self, BootstrapError> {
        config.validate().map_err(BootstrapError::InvalidConfig)?;
        let timezone = config
            .tariff
            .tz()
            .map_err(|e| BootstrapError::InvalidConfig(vec![e]))?;

        let pool = Arc::new(create_pool(&config.database)?);
        let cache: Arc<dyn CachePort> = Arc::new(MokaCache::new());

        let mut estimator =
            DistanceEstimator::new(Arc::clone(&cache)).with_cache_ttl(config.routing.cache_ttl());
        if let Some(adapter) = RoutingAdapter::from_config(
            &config.routing.provider,
            config.routing.circuit_breaker.clone(),
        )? {
            let routing: Arc<dyn RoutingPort> = Arc::new(adapter);
            estimator = estimator.with_routing(routing);
        }
        let estimator = Arc::new(estimator);

        let limiter = Arc::new(TokenBucketLimiter::new(
            config.geocoding.rate_limiter_config(),
        ));
        let geocoding = Arc::new(GeocodingService::new(
            Arc::new(GeocodingAdapter::from_config(&config.geocoding.provider)?),
            Arc::clone(&cache),
            Arc::clone(&limiter),
            config.geocoding.service_config(),
        ));

        let quotes = QuoteService::new(Arc::clone(&estimator));

        let trips: Arc<dyn FeaturedTripStore> =
            Arc::new(SqliteFeaturedTripStore::new(Arc::clone(&pool)));
        let addresses: Arc<dyn AddressStore> =
            Arc::new(SqliteAddressStore::new(Arc::clone(&pool)));
        let refresher = Arc::new(FeaturedTripRefresher::new(
            Arc::clone(&trips),
            addresses,
            Arc::clone(&geocoding),
            quotes.clone(),
            config.refresher.refresher_config(),
        ));

        let tariff_store: Arc<dyn TariffConfigStore> = Arc::new(SqliteTariffStore::new(
            Arc::clone(&pool),
            config.tariff.default,
        ));
        let tariffs =
            Arc::new(TariffService::new(tariff_store).with_refresher(Arc::clone(&refresher)));

        info!(
            routing = estimator.has_routing(),
            geocoding = config.geocoding.provider.is_configured(),
            timezone = %timezone,
            "Services initialized"
        );

        Ok(Self {
            pool,
            cache,
            limiter,
            estimator,
            geocoding,
            quotes,
            refresher,
            tariffs,
            trips,
            timezone,
        })
    }
}
