//! Map provider integration for TaxiFare
//!
//! Provides road routing via [OpenRouteService](https://openrouteservice.org)
//! and forward geocoding via the
//! [Google Geocoding API](https://developers.google.com/maps/documentation/geocoding).
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern: [`RoutingClient`] is implemented
//! by [`OpenRouteServiceClient`], [`GeocodingClient`] by
//! [`GoogleGeocodingClient`]. Both clients only speak HTTP and decode the
//! provider payloads; caching, rate limiting and fallback live in the
//! application layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::Coordinate;
//! use integration_maps::{OpenRouteServiceClient, RoutingClient, RoutingConfig};
//!
//! let client = OpenRouteServiceClient::new(&RoutingConfig::default())?;
//! let summary = client
//!     .route(Coordinate::new(45.764, 4.835)?, Coordinate::new(45.188, 5.724)?)
//!     .await?;
//! ```

mod config;
mod error;
mod geocoding;
mod models;
mod routing;

pub use config::{GeocodingConfig, RoutingConfig};
pub use error::MapsError;
pub use geocoding::{GeocodingClient, GoogleGeocodingClient};
pub use models::{AddressComponent, GeocodeResult, GeocodeStatus, Geometry, LatLng, RouteSummary};
pub use routing::{OpenRouteServiceClient, RoutingClient};
