use std::future::Future;
use std::sync::Arc;

use orecart_core::api::{AlertFilter, FileTokenStore, MemoryTokenStore, TokenStore};
use orecart_core::feed::VanFilter;
use orecart_core::transit::{Coordinate, RouteId, StopId, TransitDirectory};
use orecart_core::{ClientConfig, OreCartClient};
use tokio::runtime::Runtime;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::MobileError;
use crate::state::live::{ArrivalObserver, LiveSubscription, VanLocationsObserver};
use crate::state::records::{
    AlertInfo, AlertWindow, ArrivalState, NearestStop, RouteInfo, StopInfo, VanLocationsState,
};

pub mod live;
pub mod records;

/// Everything the app shell talks to. Owns its own runtime so that feed tasks
/// keep running no matter which executor the foreign side polls us on.
#[derive(uniffi::Object)]
pub struct OreCartState {
    runtime: Runtime,
    client: OreCartClient,
    directory: RwLock<Option<Arc<TransitDirectory>>>,
}

#[uniffi::export]
impl OreCartState {
    /// `token_path` persists the admin session; without it the session lives in memory.
    #[uniffi::constructor]
    pub fn new(api_domain: String, secure: bool, token_path: Option<String>) -> Result<Arc<Self>, MobileError> {
        let config = ClientConfig::from_domain(&api_domain, secure)?;
        Self::with_config(config, token_path)
    }

    /// Same as [`OreCartState::new`] but from a JSON-encoded client config.
    #[uniffi::constructor]
    pub fn from_config_json(config_json: String, token_path: Option<String>) -> Result<Arc<Self>, MobileError> {
        let config: ClientConfig = serde_json::from_str(&config_json)?;
        config.validate()?;
        Self::with_config(config, token_path)
    }

    pub async fn login(&self, username: String, password: String) -> Result<(), MobileError> {
        let api = self.client.api().clone();
        self.on_runtime(async move { Ok(api.login(&username, &password).await?) })
            .await
    }

    pub async fn logout(&self) -> Result<(), MobileError> {
        let api = self.client.api().clone();
        self.on_runtime(async move { Ok(api.logout().await?) }).await
    }

    pub async fn is_logged_in(&self) -> Result<bool, MobileError> {
        let api = self.client.api().clone();
        self.on_runtime(async move { Ok(api.check_auth().await?) }).await
    }

    pub async fn routes(&self) -> Result<Vec<RouteInfo>, MobileError> {
        let directory = self.directory().await?;
        Ok(directory.all_routes().iter().map(|route| RouteInfo::from(route.as_ref())).collect())
    }

    pub async fn stops(&self) -> Result<Vec<StopInfo>, MobileError> {
        let directory = self.directory().await?;
        Ok(directory.all_stops().iter().map(|stop| StopInfo::from(stop.as_ref())).collect())
    }

    /// Stops in the order the route visits them.
    pub async fn stops_for_route(&self, route_id: u32) -> Result<Vec<StopInfo>, MobileError> {
        let directory = self.directory().await?;
        let stops = directory
            .stops_for_route(RouteId::new(route_id))
            .map_err(|e| MobileError::Api(e.to_string()))?;

        Ok(stops.iter().map(|stop| StopInfo::from(stop.as_ref())).collect())
    }

    pub async fn nearest_stop(&self, latitude: f64, longitude: f64) -> Result<Option<NearestStop>, MobileError> {
        let here = Coordinate::validated(latitude, longitude).map_err(|e| MobileError::Api(e.to_string()))?;
        let directory = self.directory().await?;

        Ok(directory.nearest_stop(here, true).map(NearestStop::from))
    }

    pub async fn alerts(&self, window: AlertWindow) -> Result<Vec<AlertInfo>, MobileError> {
        let filter = match window {
            AlertWindow::Active => AlertFilter::Active,
            AlertWindow::Future => AlertFilter::Future,
        };
        let api = self.client.api().clone();
        let alerts = self.on_runtime(async move { Ok(api.alerts(filter).await?) }).await?;

        Ok(alerts.iter().map(AlertInfo::from).collect())
    }

    /// Forget cached routes and stops; the next call refetches them.
    pub async fn refresh(&self) {
        *self.directory.write().await = None;
    }

    pub async fn watch_arrival(
        &self,
        stop_id: u32,
        route_id: u32,
        observer: Arc<dyn ArrivalObserver>,
    ) -> Result<Arc<LiveSubscription>, MobileError> {
        let client = self.client.clone();
        let subscription = self
            .on_runtime(async move {
                Ok(client
                    .arrival_estimate(StopId::new(stop_id), RouteId::new(route_id))
                    .await?)
            })
            .await?;

        Ok(Arc::new(LiveSubscription::forward(
            self.runtime.handle(),
            subscription,
            move |query| observer.on_update(ArrivalState::from(query)),
        )))
    }

    /// An empty `route_ids` means every route.
    pub async fn watch_vans(
        &self,
        route_ids: Vec<u32>,
        observer: Arc<dyn VanLocationsObserver>,
    ) -> Result<Arc<LiveSubscription>, MobileError> {
        let filter = if route_ids.is_empty() {
            VanFilter::alive()
        } else {
            VanFilter::on_routes(route_ids.into_iter().map(RouteId::new))
        };

        let client = self.client.clone();
        let subscription = self
            .on_runtime(async move { Ok(client.van_locations(filter).await?) })
            .await?;

        Ok(Arc::new(LiveSubscription::forward(
            self.runtime.handle(),
            subscription,
            move |query| observer.on_update(VanLocationsState::from(query)),
        )))
    }
}

impl OreCartState {
    fn with_config(config: ClientConfig, token_path: Option<String>) -> Result<Arc<Self>, MobileError> {
        let runtime = Runtime::new()?;

        let tokens: Arc<dyn TokenStore> = match token_path {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };

        // Feed tasks are spawned on construction and need a runtime context
        let client = {
            let _guard = runtime.enter();
            OreCartClient::new(&config, tokens)
        };
        info!(api = %config.api_url, "client ready");

        Ok(Arc::new(Self {
            runtime,
            client,
            directory: RwLock::new(None),
        }))
    }

    async fn on_runtime<T, Fut>(&self, future: Fut) -> Result<T, MobileError>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, MobileError>> + Send + 'static,
    {
        self.runtime.spawn(future).await?
    }

    async fn directory(&self) -> Result<Arc<TransitDirectory>, MobileError> {
        if let Some(ref directory) = *(self.directory.read().await) {
            return Ok(Arc::clone(directory));
        }

        let mut guard = self.directory.write().await;
        // Another caller may have loaded it while we waited for the lock
        if let Some(ref directory) = *guard {
            return Ok(Arc::clone(directory));
        }

        let client = self.client.clone();
        let directory = Arc::new(self.on_runtime(async move { Ok(client.directory().await?) }).await?);
        *guard = Some(Arc::clone(&directory));

        Ok(directory)
    }
}
