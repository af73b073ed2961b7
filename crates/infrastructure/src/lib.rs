//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports: map providers through
//! `integration_maps`, an in-memory cache, SQLite persistence. Also owns
//! configuration loading, logging setup and the service wiring.

pub mod adapters;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{BootstrapError, Services};
pub use cache::{MokaCache, MokaCacheConfig};
pub use config::{AppConfig, DatabaseConfig, ServerConfig};
pub use persistence::{ConnectionPool, check_connection, create_pool};
pub use telemetry::{LogFormat, LoggingConfig, init_logging};
