//! Map provider configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the OpenRouteService routing client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL for the OpenRouteService API
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,

    /// API key; routing is disabled when absent
    #[serde(default)]
    pub api_key: Option<String>,

    /// Routing profile (e.g. "driving-car")
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Configuration for the Google geocoding client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocode endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// ISO country code results are restricted to (e.g. "FR")
    #[serde(default = "default_country")]
    pub country: String,

    /// Preferred result language
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_routing_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_profile() -> String {
    "driving-car".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode".to_string()
}

fn default_country() -> String {
    "FR".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

const fn default_timeout_secs() -> u64 {
    5
}

fn validate_common(base_url: &str, timeout_secs: u64) -> Result<(), String> {
    Url::parse(base_url).map_err(|e| format!("invalid base_url '{base_url}': {e}"))?;
    if timeout_secs == 0 {
        return Err("timeout_secs must be greater than 0".to_string());
    }
    Ok(())
}

fn has_key(api_key: Option<&String>) -> bool {
    api_key.is_some_and(|k| !k.trim().is_empty())
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
            api_key: None,
            profile: default_profile(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RoutingConfig {
    /// Create a configuration pointing at a local mock server
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    /// Whether an API key is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        has_key(self.api_key.as_ref())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_common(&self.base_url, self.timeout_secs)?;
        if self.profile.trim().is_empty() {
            return Err("profile must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            api_key: None,
            country: default_country(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeocodingConfig {
    /// Create a configuration pointing at a local mock server
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    /// Whether an API key is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        has_key(self.api_key.as_ref())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_common(&self.base_url, self.timeout_secs)?;
        if self.country.len() != 2 {
            return Err(format!("country must be a two-letter code, got '{}'", self.country));
        }
        Ok(())
    }
}
