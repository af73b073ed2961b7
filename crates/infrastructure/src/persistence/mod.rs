//! SQLite persistence layer

mod address_store;
mod connection;
mod featured_trip_store;
pub mod migrations;
mod tariff_store;

pub use address_store::SqliteAddressStore;
pub use connection::{ConnectionPool, DatabaseError, check_connection, create_pool};
pub use featured_trip_store::SqliteFeaturedTripStore;
pub use tariff_store::SqliteTariffStore;

use application::error::ApplicationError;

pub(crate) fn internal(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Internal(e.to_string())
}
