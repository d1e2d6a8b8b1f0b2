//! Type-safe identifiers for shuttle entities.
//!
//! The backend hands out plain integer ids. Each entity gets its own newtype so a
//! stop id can never be passed where a route id is expected. All of them are
//! `Copy` and serialize transparently, including as JSON object keys.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self::new(id)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

impl_identifier!(StopId);
impl_identifier!(RouteId);
impl_identifier!(VanId);
impl_identifier!(AlertId);
impl_identifier!(PickupSpotId);
impl_identifier!(AdaRequestId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopId::new(12);
        let id2 = StopId::from(12);
        let id3 = id1;

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(id1.get(), 12);
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(RouteId::new(3), 42);

        assert_eq!(map.get(&RouteId::new(3)), Some(&42));
    }

    #[test]
    fn test_identifier_display() {
        let id = RouteId::new(7);
        assert_eq!(format!("{}", id), "7");
    }

    #[test]
    fn test_identifier_parse() {
        assert_eq!(" 19 ".parse::<VanId>(), Ok(VanId::new(19)));
        assert!("nineteen".parse::<VanId>().is_err());
    }

    #[test]
    fn test_identifier_as_json_key() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(StopId::new(4), vec![RouteId::new(1), RouteId::new(2)]);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"4":[1,2]}"#);

        let back: BTreeMap<StopId, Vec<RouteId>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
