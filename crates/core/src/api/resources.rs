//! Typed wrappers over the backend's REST endpoints.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use orecart_api_types::{AdaRequestBody, AlertBody, KmlFile, PickupSpotBody, VanBody, VanList};
use orecart_transit::{
    AdaRequest, Alert, AlertId, PickupSpot, PickupSpotId, RidershipRecord, Route, RouteId, Stop,
    StopId, Van, VanId,
};

use crate::api::{ApiClient, ApiError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AlertFilter {
    Active,
    Future,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AdaFilter {
    Today,
    Future,
}

const ROUTE_INCLUDES: [(&str, &str); 3] = [
    ("include", "stopIds"),
    ("include", "waypoints"),
    ("include", "isActive"),
];

const STOP_INCLUDES: [(&str, &str); 3] = [
    ("include", "routeIds"),
    ("include", "location"),
    ("include", "isActive"),
];

impl ApiClient {
    // Routes

    pub async fn routes(&self) -> Result<Vec<Route>> {
        let request = self.request(Method::GET, "/routes/").await?.query(&ROUTE_INCLUDES);
        self.fetch_json(request).await
    }

    /// The backend answers a single-route lookup with a list.
    pub async fn route(&self, id: RouteId) -> Result<Route> {
        let request = self
            .request(Method::GET, &format!("/routes/{id}"))
            .await?
            .query(&ROUTE_INCLUDES);
        let routes: Vec<Route> = self.fetch_json(request).await?;

        routes
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidData(format!("empty response for route {id}")))
    }

    pub async fn route_stops(&self, id: RouteId) -> Result<Vec<Stop>> {
        let request = self
            .request(Method::GET, &format!("/routes/{id}/stops"))
            .await?
            .query(&STOP_INCLUDES);
        self.fetch_json(request).await
    }

    /// Remove every route, stop and waypoint.
    pub async fn clear_routes(&self) -> Result<()> {
        let request = self.request(Method::DELETE, "/routes/").await?;
        self.fetch_unit(request).await
    }

    /// The KML export of the whole network, decoded.
    pub async fn routes_kml(&self) -> Result<String> {
        let request = self.request(Method::GET, "/routes/kmlfile").await?;
        let file: KmlFile = self.fetch_json(request).await?;

        let bytes = STANDARD
            .decode(file.base64.trim())
            .map_err(|e| ApiError::InvalidData(format!("kml export is not base64: {e}")))?;
        String::from_utf8(bytes).map_err(|e| ApiError::InvalidData(format!("kml export is not utf-8: {e}")))
    }

    // Stops

    pub async fn stops(&self) -> Result<Vec<Stop>> {
        let request = self.request(Method::GET, "/stops/").await?.query(&STOP_INCLUDES);
        self.fetch_json(request).await
    }

    pub async fn stop(&self, id: StopId) -> Result<Stop> {
        let request = self
            .request(Method::GET, &format!("/stops/{id}"))
            .await?
            .query(&STOP_INCLUDES);
        let stops: Vec<Stop> = self.fetch_json(request).await?;

        stops
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidData(format!("empty response for stop {id}")))
    }

    // Alerts

    pub async fn alerts(&self, filter: AlertFilter) -> Result<Vec<Alert>> {
        let request = self
            .request(Method::GET, "/alerts/")
            .await?
            .query(&[("filter", filter.as_ref())]);
        self.fetch_json(request).await
    }

    pub async fn alert(&self, id: AlertId) -> Result<Alert> {
        let request = self.request(Method::GET, &format!("/alerts/{id}")).await?;
        self.fetch_json(request).await
    }

    pub async fn create_alert(&self, body: &AlertBody) -> Result<()> {
        let request = self.request(Method::POST, "/alerts/").await?.json(body);
        self.fetch_unit(request).await
    }

    pub async fn update_alert(&self, id: AlertId, body: &AlertBody) -> Result<()> {
        let request = self
            .request(Method::PUT, &format!("/alerts/{id}"))
            .await?
            .json(body);
        self.fetch_unit(request).await
    }

    pub async fn delete_alert(&self, id: AlertId) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/alerts/{id}")).await?;
        self.fetch_unit(request).await
    }

    // Vans

    pub async fn vans(&self) -> Result<Vec<Van>> {
        let request = self.request(Method::GET, "/vans/").await?;
        let list: VanList = self.fetch_json(request).await?;
        Ok(list.vans)
    }

    pub async fn van(&self, id: VanId) -> Result<Van> {
        let request = self.request(Method::GET, &format!("/vans/{id}")).await?;
        self.fetch_json(request).await
    }

    pub async fn create_van(&self, body: &VanBody) -> Result<()> {
        let request = self.request(Method::POST, "/vans/").await?.json(body);
        self.fetch_unit(request).await
    }

    pub async fn update_van(&self, id: VanId, body: &VanBody) -> Result<()> {
        let request = self.request(Method::PUT, &format!("/vans/{id}")).await?.json(body);
        self.fetch_unit(request).await
    }

    pub async fn delete_van(&self, id: VanId) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/vans/{id}")).await?;
        self.fetch_unit(request).await
    }

    // ADA

    pub async fn pickup_spots(&self) -> Result<Vec<PickupSpot>> {
        let request = self.request(Method::GET, "/ada/pickup_spots").await?;
        self.fetch_json(request).await
    }

    pub async fn create_pickup_spot(&self, body: &PickupSpotBody) -> Result<()> {
        let request = self.request(Method::POST, "/ada/pickup_spots").await?.json(body);
        self.fetch_unit(request).await
    }

    pub async fn update_pickup_spot(&self, id: PickupSpotId, body: &PickupSpotBody) -> Result<()> {
        let request = self
            .request(Method::PUT, &format!("/ada/pickup_spots/{id}"))
            .await?
            .json(body);
        self.fetch_unit(request).await
    }

    pub async fn delete_pickup_spot(&self, id: PickupSpotId) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("/ada/pickup_spots/{id}"))
            .await?;
        self.fetch_unit(request).await
    }

    pub async fn ada_requests(&self, filter: AdaFilter) -> Result<Vec<AdaRequest>> {
        let request = self
            .request(Method::GET, "/ada/requests")
            .await?
            .query(&[("filter", filter.as_ref()), ("include", "pickup_spot")]);
        self.fetch_json(request).await
    }

    pub async fn create_ada_request(&self, body: &AdaRequestBody) -> Result<()> {
        let request = self.request(Method::POST, "/ada/requests").await?.json(body);
        self.fetch_unit(request).await
    }

    // Analytics

    pub async fn ridership(&self) -> Result<Vec<RidershipRecord>> {
        let request = self.request(Method::GET, "/analytics/ridership/").await?;
        self.fetch_json(request).await
    }
}
