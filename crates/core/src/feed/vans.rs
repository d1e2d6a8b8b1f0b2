//! Live van location feed.

use std::collections::BTreeSet;

use orecart_api_types::{VAN_LOCATION_INCLUDES, VanLocationMessage, VanLocationQuery, VanLocationResponse};
use orecart_transit::{RouteId, VanLocation};

use crate::feed::{Feed, FeedMessage};

/// Which vans a subscriber wants to see.
///
/// The feed only ever asks for vans with a live tracker session. Liveness is
/// not part of a van's location, so it can't be narrowed per subscriber.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VanFilter {
    /// Restrict to these routes; `None` means every route
    pub route_ids: Option<BTreeSet<RouteId>>,
}

impl VanFilter {
    /// Every van currently being tracked, the map's default view.
    pub fn alive() -> Self {
        Self { route_ids: None }
    }

    pub fn on_routes(routes: impl IntoIterator<Item = RouteId>) -> Self {
        Self {
            route_ids: Some(routes.into_iter().collect()),
        }
    }

    pub fn matches(&self, van: &VanLocation) -> bool {
        match (&self.route_ids, van.route_id) {
            (None, _) => true,
            (Some(routes), Some(route_id)) => routes.contains(&route_id),
            (Some(_), None) => false,
        }
    }
}

pub struct VanLocationFeed;

impl Feed for VanLocationFeed {
    type Key = VanFilter;
    type Value = Vec<VanLocation>;
    type Snapshot = Vec<VanLocation>;

    const NAME: &'static str = "van locations";
    const PATH: &'static str = "/vans/v2/subscribe/";

    /// The server takes one query, so the route filters are widened into a
    /// single superset and each subscriber narrows the snapshot again on lookup.
    fn request<'a, I>(keys: I) -> Result<String, serde_json::Error>
    where
        I: Iterator<Item = &'a VanFilter>,
    {
        let mut route_ids = Some(BTreeSet::new());

        for filter in keys {
            route_ids = match (route_ids, &filter.route_ids) {
                (Some(mut union), Some(routes)) => {
                    union.extend(routes.iter().copied());
                    Some(union)
                }
                _ => None,
            };
        }

        let message = VanLocationMessage {
            include: VAN_LOCATION_INCLUDES.iter().map(|s| s.to_string()).collect(),
            query: VanLocationQuery::Vans {
                alive: Some(true),
                route_ids,
            },
        };

        serde_json::to_string(&message)
    }

    fn decode(text: &str) -> Result<FeedMessage<Vec<VanLocation>>, serde_json::Error> {
        Ok(match serde_json::from_str::<VanLocationResponse>(text)? {
            VanLocationResponse::Vans { vans } => FeedMessage::Snapshot(vans),
            VanLocationResponse::Error { error } => FeedMessage::Error(error),
        })
    }

    fn lookup(snapshot: &Vec<VanLocation>, key: &VanFilter) -> Vec<VanLocation> {
        snapshot.iter().filter(|van| key.matches(van)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use orecart_transit::{Coordinate, VanId};

    use super::*;

    fn van(guid: u32, route: Option<u32>) -> VanLocation {
        VanLocation {
            guid: VanId::new(guid),
            color: "#2b5fab".into(),
            location: Coordinate::new(39.75, -105.22),
            route_id: route.map(RouteId::new),
        }
    }

    #[test]
    fn test_request_for_single_alive_filter() {
        let request = VanLocationFeed::request([VanFilter::alive()].iter()).unwrap();

        assert_eq!(
            request,
            r#"{"include":["color","location","routeId"],"query":{"type":"vans","alive":true}}"#
        );
    }

    #[test]
    fn test_request_unions_routes() {
        let filters = [
            VanFilter::on_routes([RouteId::new(2)]),
            VanFilter::on_routes([RouteId::new(1), RouteId::new(2)]),
        ];
        let request = VanLocationFeed::request(filters.iter()).unwrap();

        assert!(request.contains(r#""routeIds":[1,2]"#));
        assert!(request.contains(r#""alive":true"#));
    }

    #[test]
    fn test_request_widens_to_all() {
        let filters = [
            VanFilter::on_routes([RouteId::new(2)]),
            VanFilter::alive(),
        ];
        let request = VanLocationFeed::request(filters.iter()).unwrap();

        assert!(!request.contains("routeIds"));
        assert!(request.contains(r#""alive":true"#));
    }

    #[test]
    fn test_lookup_narrows_per_filter() {
        let snapshot = vec![van(1, Some(1)), van(2, Some(2)), van(3, None)];

        let all = VanLocationFeed::lookup(&snapshot, &VanFilter::alive());
        assert_eq!(all.len(), 3);

        let gold = VanLocationFeed::lookup(&snapshot, &VanFilter::on_routes([RouteId::new(2)]));
        assert_eq!(gold, vec![van(2, Some(2))]);
    }

    #[test]
    fn test_decode_error() {
        let message =
            VanLocationFeed::decode(r#"{"type":"error","error":"Invalid query"}"#).unwrap();
        assert_eq!(message, FeedMessage::Error("Invalid query".into()));
    }
}
