//! Address entity - a durable, possibly geocoded address record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AddressCandidate, AddressId, Coordinate};

/// A persisted address, created from a geocoding candidate or an admin label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub label: String,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Known position, if the address has been geocoded
    pub coordinate: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Promote a geocoding candidate into a new address record
    #[must_use]
    pub fn from_candidate(candidate: &AddressCandidate) -> Self {
        let now = Utc::now();
        Self {
            id: AddressId::new(),
            label: candidate.label.clone(),
            street: candidate.street.clone(),
            street_number: candidate.street_number.clone(),
            postcode: candidate.postcode.clone(),
            city: candidate.city.clone(),
            country: candidate.country.clone(),
            coordinate: Some(candidate.coordinate()),
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored position, if present and valid
    #[must_use]
    pub fn known_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }
}
