//! Client core for the OreCart shuttle tracker.
//!
//! REST access to routes, stops, alerts, vans and ADA pickups lives in
//! [`api`]. Live arrival estimates and van positions come from [`feed`]s,
//! multiplexed over one socket per feed by [`subscription`]. Both surface to
//! UI code as [`Query`] values.

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod query;
pub mod subscription;
pub mod tracker;

pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, FeedError};
pub use query::Query;
pub use tracker::OreCartClient;

// Re-export the shared model crates
pub use orecart_api_types as api_types;
pub use orecart_transit as transit;
