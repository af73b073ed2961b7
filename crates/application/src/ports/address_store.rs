//! Address storage port

use async_trait::async_trait;
use domain::{entities::Address, value_objects::{AddressId, Coordinate}};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for durable address records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Get an address by ID
    async fn get(&self, id: AddressId) -> Result<Option<Address>, ApplicationError>;

    /// Insert a new address and return it as stored
    async fn create(&self, address: &Address) -> Result<Address, ApplicationError>;

    /// Overwrite the coordinates of an existing address
    async fn update_coordinates(
        &self,
        id: AddressId,
        coordinate: Coordinate,
    ) -> Result<(), ApplicationError>;
}
