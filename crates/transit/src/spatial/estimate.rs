//! Rough travel estimates and display formatting for distances and times.

use crate::spatial::queries::geo_distance_to_miles;

/// Average van speed used when no live estimate is available.
pub const AVERAGE_VAN_SPEED_MPH: f64 = 20.0;

/// Estimate travel time in hours for a lat/lon distance at average van speed.
pub fn estimate_travel_hours(distance_lat_lon: f64) -> f64 {
    geo_distance_to_miles(distance_lat_lon) / AVERAGE_VAN_SPEED_MPH
}

pub fn format_miles(miles: f64) -> String {
    if miles < 0.1 {
        "<0.1 mi".to_string()
    } else {
        format!("{miles:.1} mi")
    }
}

pub fn format_seconds_as_minutes(seconds: u32) -> String {
    if seconds < 60 {
        "<1 min".to_string()
    } else {
        format!("{} min", (f64::from(seconds) / 60.0).round() as u32)
    }
}
