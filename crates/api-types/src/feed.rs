//! Envelopes exchanged over the live feed sockets.
//!
//! Clients always send their full desired subscription set. The server pushes
//! snapshots tagged with a `type` discriminator, or an error envelope.

use std::collections::{BTreeMap, BTreeSet};

use orecart_transit::{RouteId, StopId, VanLocation};
use serde::{Deserialize, Serialize};

/// Predicted seconds until arrival. The backend may send fractional values.
pub type Seconds = f64;

/// Requested estimates: for each stop, the routes of interest.
pub type ArrivalRequest = BTreeMap<StopId, Vec<RouteId>>;

/// Estimates keyed the same way as the request. Pairs with no estimate are absent.
pub type ArrivalTable = BTreeMap<StopId, BTreeMap<RouteId, Seconds>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArrivalResponse", into = "RawArrivalResponse")]
pub enum ArrivalResponse {
    Arrivals { arrivals: ArrivalTable },
    Error { error: String },
}

// Internally tagged enums buffer their content, which loses the ability to read
// integer map keys from JSON strings. Decode through a flat struct instead.
#[derive(Serialize, Deserialize)]
struct RawArrivalResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arrivals: Option<ArrivalTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawArrivalResponse> for ArrivalResponse {
    type Error = String;

    fn try_from(raw: RawArrivalResponse) -> Result<Self, String> {
        match (raw.kind.as_str(), raw.arrivals, raw.error) {
            ("arrivals", Some(arrivals), _) => Ok(ArrivalResponse::Arrivals { arrivals }),
            ("error", _, Some(error)) => Ok(ArrivalResponse::Error { error }),
            (kind, _, _) => Err(format!("unexpected arrival message type `{kind}`")),
        }
    }
}

impl From<ArrivalResponse> for RawArrivalResponse {
    fn from(response: ArrivalResponse) -> Self {
        match response {
            ArrivalResponse::Arrivals { arrivals } => Self {
                kind: "arrivals".into(),
                arrivals: Some(arrivals),
                error: None,
            },
            ArrivalResponse::Error { error } => Self {
                kind: "error".into(),
                arrivals: None,
                error: Some(error),
            },
        }
    }
}

/// Fields the van location feed should include in each van.
pub const VAN_LOCATION_INCLUDES: [&str; 3] = ["color", "location", "routeId"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanLocationMessage {
    pub include: Vec<String>,
    pub query: VanLocationQuery,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VanLocationQuery {
    Vans {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alive: Option<bool>,
        #[serde(
            default,
            rename = "routeIds",
            skip_serializing_if = "Option::is_none"
        )]
        route_ids: Option<BTreeSet<RouteId>>,
    },
    Van {
        guid: orecart_transit::VanId,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VanLocationResponse {
    Vans { vans: Vec<VanLocation> },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_request_shape() {
        let mut request = ArrivalRequest::new();
        request.insert(StopId::new(5), vec![RouteId::new(1), RouteId::new(2)]);

        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"5":[1,2]}"#);
    }

    #[test]
    fn test_arrival_response_discriminator() {
        let ok: ArrivalResponse =
            serde_json::from_str(r#"{"type":"arrivals","arrivals":{"5":{"1":42.5}}}"#).unwrap();
        let ArrivalResponse::Arrivals { arrivals } = ok else {
            panic!("expected arrivals");
        };
        assert_eq!(arrivals[&StopId::new(5)][&RouteId::new(1)], 42.5);

        let err: ArrivalResponse =
            serde_json::from_str(r#"{"type":"error","error":"no vans"}"#).unwrap();
        assert_eq!(err, ArrivalResponse::Error { error: "no vans".into() });

        let bad = serde_json::from_str::<ArrivalResponse>(r#"{"type":"vans","vans":[]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_van_location_message_shape() {
        let message = VanLocationMessage {
            include: VAN_LOCATION_INCLUDES.iter().map(|s| s.to_string()).collect(),
            query: VanLocationQuery::Vans {
                alive: Some(true),
                route_ids: None,
            },
        };

        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"include":["color","location","routeId"],"query":{"type":"vans","alive":true}}"#
        );
    }

    #[test]
    fn test_van_location_response() {
        let response: VanLocationResponse = serde_json::from_str(
            r##"{"type":"vans","vans":[{"guid":3,"color":"#ff0000",
                "location":{"latitude":39.7,"longitude":-105.2}}]}"##,
        )
        .unwrap();

        let VanLocationResponse::Vans { vans } = response else {
            panic!("expected vans");
        };
        assert_eq!(vans.len(), 1);
        assert_eq!(vans[0].route_id, None);
    }
}
