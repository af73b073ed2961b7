//! Application configuration
//!
//! Layered as defaults, then an optional `config.toml`, then `TAXIFARE_*`
//! environment variables (`__` separates nested keys, e.g.
//! `TAXIFARE_ROUTING__API_KEY`).
//!
//! - `server`: HTTP server settings
//! - `database`: SQLite database settings
//! - `geocoding`, `routing`: map providers
//! - `tariff`, `refresher`: pricing

mod database;
mod pricing;
mod providers;
mod server;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use pricing::{RefresherAppConfig, TariffAppConfig};
pub use providers::{GeocodingAppConfig, RoutingAppConfig};
pub use server::ServerConfig;

use crate::telemetry::LoggingConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TAXIFARE";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingAppConfig,

    /// Routing provider configuration
    #[serde(default)]
    pub routing: RoutingAppConfig,

    /// Tariff configuration
    #[serde(default)]
    pub tariff: TariffAppConfig,

    /// Featured-trip refresher configuration
    #[serde(default)]
    pub refresher: RefresherAppConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or deserialized.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific file (extension optional) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or deserialized.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Check for values that would make the service misbehave
    ///
    /// # Errors
    ///
    /// Returns every problem found, one message per entry.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be greater than 0".to_string());
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be greater than 0".to_string());
        }
        if let Err(e) = self.geocoding.provider.validate() {
            errors.push(format!("geocoding: {e}"));
        }
        if let Err(e) = self.routing.provider.validate() {
            errors.push(format!("routing: {e}"));
        }

        let limiter = self.geocoding.rate_limiter_config();
        if limiter.capacity == 0 {
            errors.push("geocoding.rate_limit_capacity must be greater than 0".to_string());
        }
        if limiter.window.is_zero() {
            errors.push("geocoding.rate_limit_window_secs must be greater than 0".to_string());
        }
        if self.routing.circuit_breaker.failure_threshold == 0 {
            errors.push("routing.circuit_breaker.failure_threshold must be greater than 0".to_string());
        }

        if let Err(e) = self.tariff.default.validate() {
            errors.push(format!("tariff.default: {e}"));
        }
        if let Err(e) = self.tariff.tz() {
            errors.push(e);
        }

        if self.refresher.workers == 0 {
            errors.push("refresher.workers must be greater than 0".to_string());
        }
        if self.refresher.enabled && self.refresher.interval_secs == 0 {
            errors.push("refresher.interval_secs must be greater than 0".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.tariff.timezone, "Europe/Paris");
        assert!(!config.routing.provider.is_configured());
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut config = AppConfig::default();
        config.refresher.workers = 0;
        config.geocoding.rate_limit_capacity = Some(0);
        config.tariff.timezone = "Mars/Olympus".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("Mars/Olympus")));
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[routing]
api_key = "ors-key"
profile = "driving-hgv"
cache_ttl_minutes = 5

[routing.circuit_breaker]
failure_threshold = 2
open_timeout = 10

[geocoding]
api_key = "g-key"
rate_limit_capacity = 10

[refresher]
enabled = true
workers = 4
tier = "B"
"#
        )
        .unwrap();

        let path = file.path().with_extension("");
        let config = AppConfig::load_from(&path.to_string_lossy()).unwrap();

        assert_eq!(config.server.port, 8088);
        assert!(config.routing.provider.is_configured());
        assert_eq!(config.routing.provider.profile, "driving-hgv");
        assert_eq!(config.routing.cache_ttl().as_secs(), 300);
        assert_eq!(config.routing.circuit_breaker.failure_threshold, 2);
        assert_eq!(config.geocoding.rate_limiter_config().capacity, 10);
        assert_eq!(config.geocoding.provider.country, "FR");
        assert_eq!(config.refresher.refresher_config().workers, 4);
        assert_eq!(config.refresher.tier, domain::value_objects::TariffTier::B);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn service_configs_fall_back_to_defaults() {
        let config = AppConfig::default();
        let geocoding = config.geocoding.service_config();
        assert_eq!(geocoding.min_query_chars, 5);
        assert_eq!(geocoding.max_results, 5);
        assert_eq!(geocoding.cache_ttl.as_secs(), 24 * 3600);
        assert_eq!(config.geocoding.rate_limiter_config().window.as_secs(), 300);
        assert_eq!(config.routing.cache_ttl().as_secs(), 600);
    }
}
