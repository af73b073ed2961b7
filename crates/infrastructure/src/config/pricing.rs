//! Tariff seeding and featured-trip refresh settings.

use application::services::RefresherConfig;
use chrono_tz::Tz;
use domain::value_objects::{TariffConfig, TariffTier};
use serde::{Deserialize, Serialize};

/// Tariff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffAppConfig {
    /// Snapshot written to an empty tariff store
    #[serde(default)]
    pub default: TariffConfig,

    /// IANA timezone used to pick the tier from a pickup time
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

impl Default for TariffAppConfig {
    fn default() -> Self {
        Self {
            default: TariffConfig::default(),
            timezone: default_timezone(),
        }
    }
}

impl TariffAppConfig {
    /// Parsed timezone
    ///
    /// # Errors
    ///
    /// Returns an error if `timezone` is not a known IANA name.
    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid tariff.timezone '{}': {e}", self.timezone))
    }
}

/// Featured-trip refresher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefresherAppConfig {
    /// Run the refresher periodically from the server
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between periodic runs
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Trips refreshed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Tier used to price featured trips
    #[serde(default)]
    pub tier: TariffTier,
}

const fn default_interval() -> u64 {
    6 * 3600
}

const fn default_workers() -> usize {
    1
}

impl Default for RefresherAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval(),
            workers: default_workers(),
            tier: TariffTier::default(),
        }
    }
}

impl RefresherAppConfig {
    /// Settings for [`application::FeaturedTripRefresher`]
    #[must_use]
    pub const fn refresher_config(&self) -> RefresherConfig {
        RefresherConfig {
            tier: self.tier,
            workers: self.workers,
        }
    }
}
