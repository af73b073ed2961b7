//! Geocoding provider port

use async_trait::async_trait;
use domain::value_objects::AddressCandidate;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for forward geocoding
///
/// Adapters map provider statuses onto the error taxonomy:
/// no results is `NotFound`, a rejected query is `InvalidInput`,
/// quota, denial and anything unexpected is `UpstreamUnavailable`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve free text into candidates, in provider order
    ///
    /// Candidates are returned as extracted from the provider; filtering,
    /// normalization and truncation are up to the caller.
    async fn geocode(&self, query: &str) -> Result<Vec<AddressCandidate>, ApplicationError>;
}
