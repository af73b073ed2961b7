//! Tariff configuration store port

use async_trait::async_trait;
use domain::value_objects::{TariffConfig, TariffSnapshot};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for versioned tariff configuration
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TariffConfigStore: Send + Sync {
    /// Latest snapshot
    async fn current(&self) -> Result<TariffSnapshot, ApplicationError>;

    /// Store a new snapshot with the next version number
    async fn save(&self, config: &TariffConfig) -> Result<TariffSnapshot, ApplicationError>;

    /// Stored snapshots, newest first
    async fn history(&self, limit: u32) -> Result<Vec<TariffSnapshot>, ApplicationError>;
}
