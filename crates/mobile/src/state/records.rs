//! Flat, FFI-friendly views of the shuttle data.

use orecart_core::Query;
use orecart_core::transit::spatial::{format_miles, format_seconds_as_minutes, geo_distance_to_miles};
use orecart_core::transit::{Alert, Closest, Route, Stop, VanLocation};

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct RouteInfo {
    pub id: u32,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub stop_ids: Vec<u32>,
    pub is_active: bool,
}

impl From<&Route> for RouteInfo {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id.get(),
            name: route.name.clone(),
            color: route.color.clone(),
            description: route.description.clone(),
            stop_ids: route.stop_ids.iter().map(|id| id.get()).collect(),
            is_active: route.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct StopInfo {
    pub id: u32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub route_ids: Vec<u32>,
    pub is_active: bool,
}

impl From<&Stop> for StopInfo {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.get(),
            name: stop.name.clone(),
            latitude: stop.location.map(|location| location.latitude),
            longitude: stop.location.map(|location| location.longitude),
            route_ids: stop.route_ids.iter().map(|id| id.get()).collect(),
            is_active: stop.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct AlertInfo {
    pub id: u32,
    pub text: String,
    /// Unix seconds
    pub start_time: i64,
    pub end_time: i64,
}

impl From<&Alert> for AlertInfo {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.get(),
            text: alert.text.clone(),
            start_time: alert.start_date_time,
            end_time: alert.end_date_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct NearestStop {
    pub stop: StopInfo,
    /// Straight-line distance, in miles
    pub distance_miles: f64,
    /// e.g. `"0.4 mi"`
    pub distance_label: String,
}

impl<S: AsRef<Stop>> From<Closest<S>> for NearestStop {
    fn from(closest: Closest<S>) -> Self {
        let miles = geo_distance_to_miles(closest.distance);

        Self {
            stop: StopInfo::from(closest.inner.as_ref()),
            distance_miles: miles,
            distance_label: format_miles(miles),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct VanMarker {
    pub guid: u32,
    pub color: String,
    pub latitude: f64,
    pub longitude: f64,
    pub route_id: Option<u32>,
}

impl From<VanLocation> for VanMarker {
    fn from(van: VanLocation) -> Self {
        Self {
            guid: van.guid.get(),
            color: van.color,
            latitude: van.location.latitude,
            longitude: van.location.longitude,
            route_id: van.route_id.map(|id| id.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum ArrivalState {
    Loading,
    /// `seconds` is `None` when no van is currently headed to the stop
    Estimate {
        seconds: Option<u32>,
        label: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl From<Query<Option<u32>>> for ArrivalState {
    fn from(query: Query<Option<u32>>) -> Self {
        match query {
            Query::Loading => Self::Loading,
            Query::Success(seconds) => Self::Estimate {
                seconds,
                label: seconds.map(format_seconds_as_minutes),
            },
            Query::Error(message) => Self::Failed { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum VanLocationsState {
    Loading,
    Vans { vans: Vec<VanMarker> },
    Failed { message: String },
}

impl From<Query<Vec<VanLocation>>> for VanLocationsState {
    fn from(query: Query<Vec<VanLocation>>) -> Self {
        match query.map(|vans| vans.into_iter().map(VanMarker::from).collect()) {
            Query::Loading => Self::Loading,
            Query::Success(vans) => Self::Vans { vans },
            Query::Error(message) => Self::Failed { message },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum AlertWindow {
    Active,
    Future,
}
