//! Tariff service
//!
//! Reads and writes the versioned tariff configuration. A successful write
//! triggers a featured-trip refresh whose failure never undoes the write.

use std::{fmt, sync::Arc};

use domain::value_objects::{TariffConfig, TariffSnapshot};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::{
    error::ApplicationError,
    ports::TariffConfigStore,
    services::featured_trip_refresher::{FeaturedTripRefresher, RefreshReport},
};

/// Result of a tariff update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffUpdate {
    pub snapshot: TariffSnapshot,
    /// `None` when no refresher is attached or the refresh could not start
    pub refresh: Option<RefreshReport>,
}

/// Service owning tariff configuration changes
#[derive(Clone)]
pub struct TariffService {
    store: Arc<dyn TariffConfigStore>,
    refresher: Option<Arc<FeaturedTripRefresher>>,
}

impl fmt::Debug for TariffService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TariffService")
            .field("has_refresher", &self.refresher.is_some())
            .finish_non_exhaustive()
    }
}

impl TariffService {
    #[must_use]
    pub fn new(store: Arc<dyn TariffConfigStore>) -> Self {
        Self {
            store,
            refresher: None,
        }
    }

    /// Attach the featured-trip refresher run after each update
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<FeaturedTripRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Latest tariff snapshot
    pub async fn current(&self) -> Result<TariffSnapshot, ApplicationError> {
        self.store.current().await
    }

    /// Previous snapshots, newest first
    pub async fn history(&self, limit: u32) -> Result<Vec<TariffSnapshot>, ApplicationError> {
        self.store.history(limit).await
    }

    /// Store a new tariff version and re-price featured trips
    #[instrument(skip(self, config))]
    pub async fn update(&self, config: TariffConfig) -> Result<TariffUpdate, ApplicationError> {
        config.validate()?;
        let snapshot = self.store.save(&config).await?;
        info!(version = snapshot.version, "Tariff configuration saved");

        let refresh = self.refresh_with(&snapshot.config).await;
        Ok(TariffUpdate { snapshot, refresh })
    }

    /// Re-price featured trips with the current tariff
    pub async fn refresh_now(&self) -> Result<Option<RefreshReport>, ApplicationError> {
        let snapshot = self.store.current().await?;
        Ok(self.refresh_with(&snapshot.config).await)
    }

    async fn refresh_with(&self, config: &TariffConfig) -> Option<RefreshReport> {
        let refresher = self.refresher.as_ref()?;
        match refresher.refresh_all(config).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, "Featured trip refresh could not run");
                None
            },
        }
    }
}
