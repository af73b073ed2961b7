//! Geocoding service
//!
//! Turns free-text addresses into ranked, normalized suggestions. Results are
//! cached per normalized query; provider calls are rate limited per client.

use std::{fmt, sync::Arc, time::Duration};

use domain::{
    address_normalization::{dedupe_candidates, normalize_candidate},
    value_objects::AddressCandidate,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{CachePort, CachePortExt, GeocodingPort, ttl},
    services::rate_limiter::TokenBucketLimiter,
};

/// Configuration for the geocoding service
#[derive(Debug, Clone)]
pub struct GeocodingServiceConfig {
    /// Minimum trimmed query length (default: 5)
    pub min_query_chars: usize,
    /// Maximum number of suggestions returned (default: 5)
    pub max_results: usize,
    /// How long results stay cached (default: 24 hours)
    pub cache_ttl: Duration,
}

impl Default for GeocodingServiceConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 5,
            max_results: 5,
            cache_ttl: ttl::GEOCODING,
        }
    }
}

/// Service resolving addresses through the geocoding provider
pub struct GeocodingService {
    provider: Arc<dyn GeocodingPort>,
    cache: Arc<dyn CachePort>,
    limiter: Arc<TokenBucketLimiter>,
    config: GeocodingServiceConfig,
}

impl fmt::Debug for GeocodingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodingService")
            .field("config", &self.config)
            .field("tracked_clients", &self.limiter.tracked_clients())
            .finish_non_exhaustive()
    }
}

fn cache_key(normalized_query: &str) -> String {
    format!("geocode:{normalized_query}")
}

impl GeocodingService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn GeocodingPort>,
        cache: Arc<dyn CachePort>,
        limiter: Arc<TokenBucketLimiter>,
        config: GeocodingServiceConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            limiter,
            config,
        }
    }

    /// Geocode on behalf of an external client
    ///
    /// A cache hit returns immediately without consuming a rate-limit token.
    #[instrument(skip(self), fields(query_len = address_text.len()))]
    pub async fn geocode(
        &self,
        address_text: &str,
        client_key: &str,
    ) -> Result<Vec<AddressCandidate>, ApplicationError> {
        let query = self.validated_query(address_text)?;
        let key = cache_key(&query.to_lowercase());

        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        self.limiter.try_acquire(client_key)?;
        self.lookup(query, &key).await
    }

    /// Geocode for trusted background jobs, bypassing the per-client limiter
    #[instrument(skip(self), fields(query_len = address_text.len()))]
    pub async fn geocode_internal(
        &self,
        address_text: &str,
    ) -> Result<Vec<AddressCandidate>, ApplicationError> {
        let query = self.validated_query(address_text)?;
        let key = cache_key(&query.to_lowercase());

        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        self.lookup(query, &key).await
    }

    fn validated_query<'a>(&self, address_text: &'a str) -> Result<&'a str, ApplicationError> {
        let query = address_text.trim();
        if query.chars().count() < self.config.min_query_chars {
            return Err(ApplicationError::InvalidInput(format!(
                "address must be at least {} characters",
                self.config.min_query_chars
            )));
        }
        Ok(query)
    }

    async fn cached(&self, key: &str) -> Option<Vec<AddressCandidate>> {
        match self.cache.get::<Vec<AddressCandidate>>(key).await {
            Ok(Some(candidates)) => {
                debug!(count = candidates.len(), "Geocoding cache hit");
                Some(candidates)
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Geocoding cache read failed, treating as miss");
                None
            },
        }
    }

    async fn lookup(&self, query: &str, key: &str) -> Result<Vec<AddressCandidate>, ApplicationError> {
        let raw = self.provider.geocode(query).await?;
        let raw_count = raw.len();

        let candidates: Vec<AddressCandidate> = dedupe_candidates(
            raw.into_iter()
                .filter(AddressCandidate::has_finite_position)
                .map(|candidate| normalize_candidate(candidate, query))
                .collect(),
        )
        .into_iter()
        .take(self.config.max_results)
        .collect();

        if candidates.is_empty() {
            return Err(ApplicationError::NotFound(format!(
                "no usable geocoding result for '{query}'"
            )));
        }

        info!(raw_count, returned = candidates.len(), "Geocoded address");

        if let Err(e) = self.cache.set(key, &candidates, self.config.cache_ttl).await {
            warn!(error = %e, "Failed to cache geocoding result");
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockCachePort, MockGeocodingPort};
    use crate::services::rate_limiter::RateLimiterConfig;

    fn candidate(label: &str, lat: f64) -> AddressCandidate {
        AddressCandidate::new(label, lat, 4.85)
    }

    fn empty_cache() -> MockCachePort {
        let mut cache = MockCachePort::new();
        cache.expect_get_bytes().returning(|_| Ok(None));
        cache.expect_set_bytes().returning(|_, _, _| Ok(()));
        cache
    }

    fn service(provider: MockGeocodingPort, cache: MockCachePort, capacity: u32) -> GeocodingService {
        GeocodingService::new(
            Arc::new(provider),
            Arc::new(cache),
            Arc::new(TokenBucketLimiter::new(RateLimiterConfig {
                capacity,
                window: Duration::from_secs(300),
            })),
            GeocodingServiceConfig::default(),
        )
    }

    #[tokio::test]
    async fn short_query_is_invalid() {
        let mut provider = MockGeocodingPort::new();
        provider.expect_geocode().never();
        let svc = service(provider, empty_cache(), 30);

        let err = svc.geocode("  ab  ", "client").await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn returns_at_most_five_in_provider_order() {
        let mut provider = MockGeocodingPort::new();
        provider.expect_geocode().returning(|_| {
            Ok((0..8)
                .map(|i| candidate(&format!("{i} Rue Test, Lyon"), 45.0 + f64::from(i)))
                .collect())
        });
        let svc = service(provider, empty_cache(), 30);

        let results = svc.geocode("rue test lyon", "client").await.unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].label, "0 Rue Test, Lyon");
        assert_eq!(results[4].label, "4 Rue Test, Lyon");
    }

    #[tokio::test]
    async fn non_finite_candidates_are_dropped() {
        let mut provider = MockGeocodingPort::new();
        provider.expect_geocode().returning(|_| {
            Ok(vec![
                candidate("Bad", f64::NAN),
                candidate("Good Place, Lyon", 45.75),
            ])
        });
        let svc = service(provider, empty_cache(), 30);

        let results = svc.geocode("good place", "client").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "Good Place, Lyon");
    }

    #[tokio::test]
    async fn all_candidates_dropped_is_not_found() {
        let mut provider = MockGeocodingPort::new();
        provider
            .expect_geocode()
            .returning(|_| Ok(vec![candidate("Nowhere", f64::INFINITY)]));
        let svc = service(provider, empty_cache(), 30);

        let err = svc.geocode("nowhere at all", "client").await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn case_duplicates_are_collapsed() {
        let mut provider = MockGeocodingPort::new();
        provider.expect_geocode().returning(|_| {
            Ok(vec![
                candidate("Place Bellecour, Lyon", 45.757),
                candidate("PLACE BELLECOUR, LYON", 45.757),
            ])
        });
        let svc = service(provider, empty_cache(), 30);

        let results = svc.geocode("place bellecour", "client").await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let mut provider = MockGeocodingPort::new();
        provider
            .expect_geocode()
            .returning(|_| Err(ApplicationError::UpstreamUnavailable("OVER_QUERY_LIMIT".into())));
        let svc = service(provider, empty_cache(), 30);

        let err = svc.geocode("10 rue de la paix", "client").await.unwrap_err();
        assert!(matches!(err, ApplicationError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn cache_hit_bypasses_provider_and_limiter() {
        let cached = vec![candidate("1 Quai Perrache, 69002 Lyon", 45.74)];
        let bytes = serde_json::to_vec(&cached).unwrap();
        let mut cache = MockCachePort::new();
        cache
            .expect_get_bytes()
            .withf(|key| key == "geocode:1 quai perrache")
            .returning(move |_| Ok(Some(bytes.clone())));

        let mut provider = MockGeocodingPort::new();
        provider.expect_geocode().never();

        // Spend the only token so a provider call would be rate limited
        let svc = service(provider, cache, 1);
        svc.limiter.try_acquire("client").unwrap();

        for _ in 0..3 {
            let results = svc.geocode("  1 Quai PERRACHE ", "client").await.unwrap();
            assert_eq!(results, cached);
        }
    }

    #[tokio::test]
    async fn exhausted_bucket_is_rate_limited() {
        let mut provider = MockGeocodingPort::new();
        provider
            .expect_geocode()
            .times(2)
            .returning(|_| Ok(vec![candidate("Somewhere, Lyon", 45.7)]));
        let svc = service(provider, empty_cache(), 2);

        assert!(svc.geocode("address one", "ip-1").await.is_ok());
        assert!(svc.geocode("address two", "ip-1").await.is_ok());
        let err = svc.geocode("address three", "ip-1").await.unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn internal_lookup_ignores_limiter() {
        let mut provider = MockGeocodingPort::new();
        provider
            .expect_geocode()
            .times(3)
            .returning(|_| Ok(vec![candidate("Somewhere, Lyon", 45.7)]));
        let svc = service(provider, empty_cache(), 1);

        for query in ["address one", "address two", "address three"] {
            assert!(svc.geocode_internal(query).await.is_ok());
        }
    }

    #[tokio::test]
    async fn results_are_cached_with_geocoding_ttl() {
        let mut cache = MockCachePort::new();
        cache.expect_get_bytes().returning(|_| Ok(None));
        cache
            .expect_set_bytes()
            .withf(|key, _, entry_ttl| key == "geocode:gare part-dieu" && *entry_ttl == ttl::GEOCODING)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut provider = MockGeocodingPort::new();
        provider
            .expect_geocode()
            .returning(|_| Ok(vec![candidate("Gare Part-Dieu, Lyon", 45.76)]));
        let svc = service(provider, cache, 30);

        svc.geocode("Gare Part-Dieu", "client").await.unwrap();
    }
}
