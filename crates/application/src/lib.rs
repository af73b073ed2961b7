//! Application layer - Use cases and orchestration
//!
//! Contains the fare quoting pipeline (distance estimation, geocoding,
//! quoting, featured-trip refresh) and the port definitions it depends on.
//! Infrastructure adapters implement the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, ErrorKind};
pub use ports::*;
pub use services::*;
