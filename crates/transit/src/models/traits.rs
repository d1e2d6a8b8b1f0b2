//! Shared traits for shuttle entities.

use crate::models::entities::*;
use crate::models::types::Coordinate;

/// Anything that sits at a single point on the map.
///
/// Spatial helpers such as [`crate::spatial::closest`] accept any `Located`
/// value. Stops carry an optional location, so they are searched as
/// `(stop, coordinate)` pairs.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

/// Anything paired with the coordinate it was found at.
impl<T> Located for (T, Coordinate) {
    fn coordinate(&self) -> Coordinate {
        self.1
    }
}

impl Located for PickupSpot {
    fn coordinate(&self) -> Coordinate {
        self.location()
    }
}

impl Located for VanLocation {
    fn coordinate(&self) -> Coordinate {
        self.location
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}
