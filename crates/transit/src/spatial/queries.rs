//! Spatial query utilities for distance calculations.
//!
//! Stop lists on a campus are short, so nearest-neighbour search is a plain
//! linear scan over raw lat/lon distance. Haversine is available when a real
//! ground distance in meters is needed.

use geo::{HaversineDistance, Point};

use crate::models::{Coordinate, Located};

/// Miles per degree of latitude, used as a flat approximation for lon as well.
pub const MILES_PER_DEGREE: f64 = 69.0;

/// An element and its distance from a search target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Closest<O> {
    pub inner: O,
    /// Distance in lat/lon degrees; see [`geo_distance_to_miles`]
    pub distance: f64,
}

/// Euclidean distance between two coordinates, in degrees.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_diff = a.latitude - b.latitude;
    let lon_diff = a.longitude - b.longitude;
    (lat_diff * lat_diff + lon_diff * lon_diff).sqrt()
}

/// Find the element of `of_all` nearest to `to`.
///
/// Ties keep the first element encountered. Returns `None` for an empty input.
pub fn closest<O, I>(of_all: I, to: Coordinate) -> Option<Closest<O>>
where
    I: IntoIterator<Item = O>,
    O: Located,
{
    let mut best: Option<Closest<O>> = None;

    for candidate in of_all {
        let d = distance(candidate.coordinate(), to);
        match &best {
            Some(current) if d >= current.distance => {}
            _ => {
                best = Some(Closest {
                    inner: candidate,
                    distance: d,
                })
            }
        }
    }

    best
}

/// Convert a lat/lon distance to approximate miles.
pub fn geo_distance_to_miles(distance: f64) -> f64 {
    distance * MILES_PER_DEGREE
}

/// Calculate Haversine distance between two coordinates in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    Point::from(a).haversine_distance(&Point::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_distance() {
        // Golden, CO to Denver, CO is roughly 20 km
        let golden = Coordinate::new(39.7555, -105.2211);
        let denver = Coordinate::new(39.7392, -104.9903);

        let dist = haversine_distance(golden, denver);
        assert!((dist - 19_800.0).abs() < 1_000.0);
    }

    #[test]
    fn test_distance_is_pythagorean() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);

        assert_relative_eq!(distance(a, b), 5.0);
        assert_relative_eq!(distance(b, a), 5.0);
    }

    #[test]
    fn test_closest_empty() {
        let none: Vec<Coordinate> = Vec::new();
        assert!(closest(none, Coordinate::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_closest_picks_minimum() {
        let points = vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(-5.0, 2.0),
        ];

        let found = closest(&points, Coordinate::new(0.5, 0.5)).unwrap();
        assert_eq!(*found.inner, Coordinate::new(1.0, 1.0));
        assert_relative_eq!(found.distance, (0.5f64 * 0.5 * 2.0).sqrt());
    }

    #[test]
    fn test_closest_ties_keep_first() {
        let points = vec![
            Coordinate::new(1.0, 0.0),
            Coordinate::new(-1.0, 0.0),
            Coordinate::new(0.0, 1.0),
        ];

        let found = closest(points.iter().enumerate().map(|(i, c)| (i, *c)), Coordinate::new(0.0, 0.0));
        assert_eq!(found.map(|c| c.inner.0), Some(0));
    }

    #[test]
    fn test_miles() {
        assert_relative_eq!(geo_distance_to_miles(0.5), 34.5);
    }
}
