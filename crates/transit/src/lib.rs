//! # orecart-transit
//!
//! Shuttle domain data shared by the OreCart clients.
//!
//! ## Features
//!
//! - **Typed identifiers**: numeric ids that can't be mixed up across entities
//! - **Entities**: stops, routes, vans, alerts, and ADA requests in the backend's JSON shape
//! - **Spatial queries**: nearest-stop search and distance/time estimates
//! - **Directory**: joined route/stop lookups over fetched data
//!
//! ## Example
//!
//! ```
//! use orecart_transit::prelude::*;
//!
//! let stop = Stop {
//!     id: StopId::new(1),
//!     name: "Student Center".into(),
//!     location: Some(Coordinate::new(39.7510, -105.2226)),
//!     route_ids: vec![RouteId::new(1)],
//!     is_active: true,
//! };
//!
//! let directory = TransitDirectory::from_data(vec![stop], vec![]);
//!
//! let here = Coordinate::new(39.7520, -105.2230);
//! let nearest = directory.nearest_stop(here, true).unwrap();
//! assert_eq!(nearest.inner.id, StopId::new(1));
//! ```

pub mod directory;
pub mod identifiers;
pub mod models;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::directory::TransitDirectory;
    pub use crate::identifiers::*;
    pub use crate::models::{entities::*, traits::*, types::*};
    pub use crate::spatial::{closest, distance, Closest};
}

pub use prelude::*;
