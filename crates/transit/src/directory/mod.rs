//! In-memory directory of routes and stops.
//!
//! Built once from the REST payloads and then queried by the UI layer to join
//! routes with their stops and to find the rider's nearest stop.

use std::collections::HashMap;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{Coordinate, Result, Route, Stop, TransitError};
use crate::spatial::{closest, Closest};

/// Route and stop lookups with the join tables precomputed.
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone, Debug, Default)]
pub struct TransitDirectory {
    // Core data, in server order
    stops: Vec<Arc<Stop>>,
    routes: Vec<Arc<Route>>,

    // Lookup maps
    stop_map: HashMap<StopId, Arc<Stop>>,
    route_map: HashMap<RouteId, Arc<Route>>,
}

impl TransitDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from fetched stops and routes
    pub fn from_data(stops: Vec<Stop>, routes: Vec<Route>) -> Self {
        let stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();

        let stop_map = stops.iter().map(|s| (s.id, s.clone())).collect();
        let route_map = routes.iter().map(|r| (r.id, r.clone())).collect();

        Self {
            stops,
            routes,
            stop_map,
            route_map,
        }
    }

    pub fn stop(&self, id: StopId) -> Option<Arc<Stop>> {
        self.stop_map.get(&id).cloned()
    }

    pub fn route(&self, id: RouteId) -> Option<Arc<Route>> {
        self.route_map.get(&id).cloned()
    }

    pub fn all_stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    pub fn all_routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Stops served by a route, in the route's stop order.
    ///
    /// Stop ids the directory doesn't know about are skipped.
    pub fn stops_for_route(&self, id: RouteId) -> Result<Vec<Arc<Stop>>> {
        let route = self.route_map.get(&id).ok_or(TransitError::RouteNotFound(id))?;

        Ok(route
            .stop_ids
            .iter()
            .filter_map(|stop_id| self.stop_map.get(stop_id).cloned())
            .collect())
    }

    /// Routes serving a stop, in the stop's route order.
    pub fn routes_for_stop(&self, id: StopId) -> Result<Vec<Arc<Route>>> {
        let stop = self.stop_map.get(&id).ok_or(TransitError::StopNotFound(id))?;

        Ok(stop
            .route_ids
            .iter()
            .filter_map(|route_id| self.route_map.get(route_id).cloned())
            .collect())
    }

    /// The stop nearest to `to`, optionally restricted to active stops.
    /// Stops without a known location are never candidates.
    pub fn nearest_stop(&self, to: Coordinate, active_only: bool) -> Option<Closest<Arc<Stop>>> {
        let found = closest(
            self.stops
                .iter()
                .filter(|stop| !active_only || stop.is_active)
                .filter_map(|stop| Some((stop, stop.location?))),
            to,
        )?;

        Some(Closest {
            inner: found.inner.0.clone(),
            distance: found.distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: u32, lat: f64, lon: f64, routes: &[u32], active: bool) -> Stop {
        Stop {
            id: StopId::new(id),
            name: format!("Stop {id}"),
            location: Some(Coordinate::new(lat, lon)),
            route_ids: routes.iter().copied().map(RouteId::new).collect(),
            is_active: active,
        }
    }

    fn route(id: u32, stops: &[u32]) -> Route {
        Route {
            id: RouteId::new(id),
            name: format!("Route {id}"),
            color: None,
            description: None,
            stop_ids: stops.iter().copied().map(StopId::new).collect(),
            waypoints: Vec::new(),
            is_active: true,
        }
    }

    fn sample() -> TransitDirectory {
        TransitDirectory::from_data(
            vec![
                stop(1, 39.750, -105.220, &[10], true),
                stop(2, 39.755, -105.225, &[10, 20], false),
                stop(3, 39.760, -105.230, &[20], true),
            ],
            vec![route(10, &[2, 1, 99]), route(20, &[2, 3])],
        )
    }

    #[test]
    fn test_empty_directory() {
        let directory = TransitDirectory::new();
        assert_eq!(directory.all_stops().len(), 0);
        assert!(directory.nearest_stop(Coordinate::new(0.0, 0.0), false).is_none());
    }

    #[test]
    fn test_stops_for_route_keeps_order_and_skips_unknown() {
        let directory = sample();
        let ids: Vec<_> = directory
            .stops_for_route(RouteId::new(10))
            .unwrap()
            .iter()
            .map(|s| s.id.get())
            .collect();

        assert_eq!(ids, vec![2, 1]);
        assert!(matches!(
            directory.stops_for_route(RouteId::new(5)),
            Err(TransitError::RouteNotFound(_))
        ));
    }

    #[test]
    fn test_routes_for_stop() {
        let directory = sample();
        let ids: Vec<_> = directory
            .routes_for_stop(StopId::new(2))
            .unwrap()
            .iter()
            .map(|r| r.id.get())
            .collect();

        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn test_nearest_stop() {
        let directory = sample();
        let here = Coordinate::new(39.7551, -105.2251);

        let any = directory.nearest_stop(here, false).unwrap();
        assert_eq!(any.inner.id, StopId::new(2));

        let active = directory.nearest_stop(here, true).unwrap();
        assert_ne!(active.inner.id, StopId::new(2));
    }

    #[test]
    fn test_nearest_stop_skips_unlocated() {
        let mut unlocated = stop(4, 0.0, 0.0, &[], true);
        unlocated.location = None;
        let directory = TransitDirectory::from_data(vec![unlocated.clone(), stop(5, 39.75, -105.22, &[], true)], vec![]);

        let here = Coordinate::new(0.0, 0.0);
        assert_eq!(directory.nearest_stop(here, true).unwrap().inner.id, StopId::new(5));

        let only_unlocated = TransitDirectory::from_data(vec![unlocated], vec![]);
        assert!(only_unlocated.nearest_stop(here, false).is_none());
    }
}
