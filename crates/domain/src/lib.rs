//! Domain layer for TaxiFare
//!
//! Contains the fare model: coordinates, tariffs, quotes, featured trips,
//! the pure tariff engine and address suggestion normalization.
//! This layer performs no I/O.

pub mod address_normalization;
pub mod entities;
pub mod errors;
pub mod pricing;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
