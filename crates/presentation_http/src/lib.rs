//! TaxiFare HTTP presentation layer
//!
//! This crate provides the HTTP API for fare quotes, address suggestions and
//! tariff management.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use middleware::{ClientKey, JsonBody};
pub use routes::create_router;
pub use state::AppState;
