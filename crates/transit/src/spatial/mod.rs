//! Coordinate maths: nearest-neighbour search, distances, and estimates.

pub mod estimate;
pub mod queries;

pub use estimate::{estimate_travel_hours, format_miles, format_seconds_as_minutes};
pub use queries::{closest, distance, geo_distance_to_miles, haversine_distance, Closest};
