//! Shuttle entities as the backend serves them.
//!
//! Field names follow the backend JSON exactly, which is why some entities are
//! camelCase and others snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::*;
use crate::models::types::Coordinate;

fn active_by_default() -> bool {
    true
}

/// A shuttle stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    /// Only present when the stop was fetched with `include=location`
    #[serde(flatten)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub route_ids: Vec<RouteId>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A shuttle route and the path its vans drive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub stop_ids: Vec<StopId>,
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// A van as registered by an administrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Van {
    pub van_id: VanId,
    pub route_id: RouteId,
    pub wheelchair: bool,
}

/// A live van position pushed over the location feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VanLocation {
    /// The van currently at this location
    pub guid: VanId,
    /// Color of the route the van is driving
    pub color: String,
    pub location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,
}

/// A service alert with an active window in Unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub text: String,
    pub start_date_time: i64,
    pub end_date_time: i64,
}

impl Alert {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_date_time, 0)
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end_date_time, 0)
    }

    /// Whether `now` falls inside the alert window (inclusive on both ends)
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.start_date_time <= now && now <= self.end_date_time
    }
}

/// A place where ADA riders can request a pickup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupSpot {
    pub id: PickupSpotId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PickupSpot {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// An accessible pickup request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaRequest {
    pub id: AdaRequestId,
    /// Unix seconds
    pub pickup_time: i64,
    pub wheelchair: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_spot: Option<PickupSpot>,
}

impl AdaRequest {
    pub fn pickup_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.pickup_time, 0)
    }
}

/// One ridership sample reported by a van.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidershipRecord {
    pub van_id: VanId,
    pub route_id: RouteId,
    pub entered: u32,
    pub exited: u32,
    pub lat: f64,
    pub lon: f64,
    /// Unix seconds
    pub datetime: i64,
}
