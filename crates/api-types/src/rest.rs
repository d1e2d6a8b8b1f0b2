//! Request and response bodies for the REST endpoints.

use orecart_transit::{PickupSpotId, RouteId, Van};
use serde::{Deserialize, Serialize};

/// Body of `POST /alerts/` and `PUT /alerts/{id}`. Times are Unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertBody {
    pub text: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// Body of `POST /vans/` and `PUT /vans/{id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanBody {
    pub route_id: RouteId,
    pub wheelchair: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupSpotBody {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `POST /ada/requests`. The pickup time must be in the future.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaRequestBody {
    pub pickup_spot_id: PickupSpotId,
    pub pickup_time: i64,
    pub wheelchair: bool,
}

/// `GET /vans/` wraps its list in an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanList {
    pub vans: Vec<Van>,
}

/// `GET /routes/kmlfile` returns the KML export base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmlFile {
    pub base64: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// The `{"message": ...}` acknowledgement most mutating endpoints return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error detail shape used by the backend for 4xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(alias = "message")]
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_van_list() {
        let list: VanList =
            serde_json::from_str(r#"{"vans":[{"van_id":1,"route_id":2,"wheelchair":false}]}"#)
                .unwrap();
        assert_eq!(list.vans[0].route_id, RouteId::new(2));
    }

    #[test]
    fn test_error_detail_aliases() {
        let a: ErrorDetail = serde_json::from_str(r#"{"detail":"Invalid filter x"}"#).unwrap();
        let b: ErrorDetail = serde_json::from_str(r#"{"message":"Van not found"}"#).unwrap();

        assert_eq!(a.detail, "Invalid filter x");
        assert_eq!(b.detail, "Van not found");
    }
}
