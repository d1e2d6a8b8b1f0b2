//! Everything a rider-facing screen needs, behind one handle.

use std::sync::Arc;

use orecart_transit::{RouteId, StopId, TransitDirectory};
use tracing::debug;

use crate::api::{ApiClient, Result, TokenStore};
use crate::config::ClientConfig;
use crate::error::FeedError;
use crate::feed::{ArrivalFeed, ArrivalKey, VanFilter, VanLocationFeed};
use crate::subscription::{FeedClient, Subscription};

/// REST client plus the two live feeds. Clones share the same feed tasks.
#[derive(Clone)]
pub struct OreCartClient {
    api: ApiClient,
    arrivals: FeedClient<ArrivalFeed>,
    vans: FeedClient<VanLocationFeed>,
}

impl OreCartClient {
    /// Must be called from within a tokio runtime; the feed tasks are spawned immediately.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api: ApiClient::new(config, tokens),
            arrivals: FeedClient::spawn(config),
            vans: FeedClient::spawn(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Live seconds-until-arrival for a van on `route_id` at `stop_id`.
    pub async fn arrival_estimate(
        &self,
        stop_id: StopId,
        route_id: RouteId,
    ) -> Result<Subscription<ArrivalFeed>, FeedError> {
        self.arrivals.subscribe(ArrivalKey::new(stop_id, route_id)).await
    }

    pub async fn van_locations(&self, filter: VanFilter) -> Result<Subscription<VanLocationFeed>, FeedError> {
        self.vans.subscribe(filter).await
    }

    /// Fetch routes and stops together and index them.
    pub async fn directory(&self) -> Result<TransitDirectory> {
        let (routes, stops) = tokio::try_join!(self.api.routes(), self.api.stops())?;
        debug!(routes = routes.len(), stops = stops.len(), "loaded directory");

        Ok(TransitDirectory::from_data(stops, routes))
    }
}
