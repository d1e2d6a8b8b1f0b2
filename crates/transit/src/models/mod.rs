//! Shuttle data models, types, and traits.

pub mod entities;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use entities::{AdaRequest, Alert, PickupSpot, RidershipRecord, Route, Stop, Van, VanLocation};
pub use traits::Located;
pub use types::{Coordinate, Result, TransitError};
