//! Background tasks for the HTTP presentation layer

mod featured_trip_refresh;
mod limiter_cleanup;

pub use featured_trip_refresh::spawn_featured_trip_refresh_task;
pub use limiter_cleanup::spawn_limiter_cleanup_task;
