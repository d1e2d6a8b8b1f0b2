//! Live data feeds pushed over a socket.
//!
//! A [`Feed`] describes one socket endpoint: what a subscriber asks for (its
//! key), how the full set of keys is encoded into the request the server
//! expects, and how each pushed snapshot is decoded and sliced back into one
//! value per key. The socket plumbing itself is shared, see
//! [`crate::subscription`].

use std::fmt::Debug;

pub mod arrivals;
pub mod vans;

pub use arrivals::{ArrivalFeed, ArrivalKey};
pub use vans::{VanFilter, VanLocationFeed};

/// A decoded push message.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedMessage<S> {
    Snapshot(S),
    Error(String),
}

pub trait Feed: Send + 'static {
    /// What a single subscriber asks for
    type Key: Clone + Ord + Debug + Send + Sync + 'static;

    /// What a single subscriber gets back from each snapshot
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// A decoded server push
    type Snapshot;

    /// Human readable name used in logs and error messages
    const NAME: &'static str;

    /// Path of the socket endpoint relative to the socket base URL
    const PATH: &'static str;

    /// Encode the full set of distinct keys into one request.
    fn request<'a, I>(keys: I) -> Result<String, serde_json::Error>
    where
        I: Iterator<Item = &'a Self::Key>;

    fn decode(text: &str) -> Result<FeedMessage<Self::Snapshot>, serde_json::Error>;

    /// Slice the part of a snapshot that a subscriber with `key` cares about.
    fn lookup(snapshot: &Self::Snapshot, key: &Self::Key) -> Self::Value;
}
