//! Wire models for the map providers

use serde::{Deserialize, Serialize};

/// Distance and duration of the best route, in provider units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Route length in meters
    pub distance_meters: f64,
    /// Travel time in seconds
    pub duration_seconds: f64,
}

/// Request body for `POST /v2/directions/{profile}`
#[derive(Debug, Serialize)]
pub(crate) struct DirectionsRequest {
    /// `[lng, lat]` pairs, start first
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsRoute {
    #[serde(default)]
    pub summary: DirectionsSummary,
}

// ORS omits zero-valued fields, a missing one means 0
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DirectionsSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Top-level status of a geocoding response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    /// At least one result
    Ok,
    /// Valid query, nothing found
    ZeroResults,
    /// Query missing or malformed
    InvalidRequest,
    /// Quota exhausted
    OverQueryLimit,
    /// Key rejected
    RequestDenied,
    /// Transient server error
    UnknownError,
    /// Any status this client does not know about
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: GeocodeStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A single geocoding match
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// Human readable address
    #[serde(default)]
    pub formatted_address: String,
    /// Position of the match
    pub geometry: Geometry,
    /// Structured address parts
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl GeocodeResult {
    /// First component tagged with the given type
    #[must_use]
    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
    }

    /// Long name of the first component matching any of `kinds`, in order of preference
    #[must_use]
    pub fn first_long_name(&self, kinds: &[&str]) -> Option<&str> {
        kinds
            .iter()
            .find_map(|kind| self.component(kind))
            .map(|c| c.long_name.as_str())
    }
}

/// Geometry block of a result
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Point location
    pub location: LatLng,
}

/// Latitude/longitude pair as returned by Google
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// A structured address part
#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    /// Full name
    pub long_name: String,
    /// Abbreviated name
    #[serde(default)]
    pub short_name: String,
    /// Component types (e.g. `route`, `postal_code`)
    #[serde(default)]
    pub types: Vec<String>,
}
