//! Application state for HTTP handlers

use std::sync::Arc;

use infrastructure::{AppConfig, Services};

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Wired quoting pipeline
    pub services: Services,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(services: Services, config: AppConfig) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }
}
