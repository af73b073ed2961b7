//! Adapters implementing application ports

mod circuit_breaker;
mod geocoding_adapter;
mod routing_adapter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use geocoding_adapter::GeocodingAdapter;
pub use routing_adapter::RoutingAdapter;
