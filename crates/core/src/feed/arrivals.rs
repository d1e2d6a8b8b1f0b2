//! Arrival estimate feed: seconds until the next van on a route reaches a stop.

use orecart_api_types::{ArrivalRequest, ArrivalResponse, ArrivalTable};
use orecart_transit::{RouteId, StopId};

use crate::feed::{Feed, FeedMessage};

/// A (stop, route) pair. The stop must be served by the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrivalKey {
    pub stop_id: StopId,
    pub route_id: RouteId,
}

impl ArrivalKey {
    pub fn new(stop_id: StopId, route_id: RouteId) -> Self {
        Self { stop_id, route_id }
    }
}

pub struct ArrivalFeed;

impl Feed for ArrivalFeed {
    type Key = ArrivalKey;
    /// `None` when the server has no estimate for the pair
    type Value = Option<u32>;
    type Snapshot = ArrivalTable;

    const NAME: &'static str = "arrivals";
    const PATH: &'static str = "/vans/v2/arrivals/subscribe";

    fn request<'a, I>(keys: I) -> Result<String, serde_json::Error>
    where
        I: Iterator<Item = &'a ArrivalKey>,
    {
        let mut request = ArrivalRequest::new();
        for key in keys {
            let routes = request.entry(key.stop_id).or_default();
            if !routes.contains(&key.route_id) {
                routes.push(key.route_id);
            }
        }

        serde_json::to_string(&request)
    }

    fn decode(text: &str) -> Result<FeedMessage<ArrivalTable>, serde_json::Error> {
        Ok(match serde_json::from_str::<ArrivalResponse>(text)? {
            ArrivalResponse::Arrivals { arrivals } => FeedMessage::Snapshot(arrivals),
            ArrivalResponse::Error { error } => FeedMessage::Error(error),
        })
    }

    fn lookup(snapshot: &ArrivalTable, key: &ArrivalKey) -> Option<u32> {
        snapshot
            .get(&key.stop_id)?
            .get(&key.route_id)
            .filter(|seconds| seconds.is_finite())
            .map(|seconds| seconds.max(0.0).round() as u32)
    }
}
