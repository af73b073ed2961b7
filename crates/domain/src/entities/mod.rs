//! Domain entities - Objects with identity and lifecycle

mod address;
mod featured_trip;

pub use address::Address;
pub use featured_trip::{FeaturedPoi, FeaturedTrip, TripRefreshStage};
