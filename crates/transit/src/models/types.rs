//! Core value types and errors for shuttle data.

use geo::Point;
use serde::{Deserialize, Serialize};

// ============================================================================
// Coordinate
// ============================================================================

/// A latitude/longitude pair in degrees.
///
/// Serialized with the backend's field names, so it can be flattened into
/// any entity that carries `latitude` and `longitude` at the top level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject coordinates outside the valid lat/lon ranges.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(TransitError::InvalidData(format!(
                "latitude {latitude} is out of range"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(TransitError::InvalidData(format!(
                "longitude {longitude} is out of range"
            )));
        }

        Ok(Self::new(latitude, longitude))
    }
}

impl From<Coordinate> for Point {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Self::new(point.y(), point.x())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Stop not found: {0}")]
    StopNotFound(crate::identifiers::StopId),

    #[error("Route not found: {0}")]
    RouteNotFound(crate::identifiers::RouteId),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
