//! Logging initialization
//!
//! Console logging through `tracing-subscriber`, human-readable or JSON.

mod logging;

pub use logging::{LogFormat, LoggingConfig, TelemetryError, init_logging};
