//! One socket per feed, shared by every subscriber of that feed.
//!
//! [`SubscriptionManager`] is the synchronous bookkeeping: who is subscribed
//! to what, what each of them currently sees, and whether a socket should be
//! open. [`FeedClient`] runs a manager on its own task and executes the
//! socket commands it asks for.

pub mod client;
pub mod manager;
pub mod registry;

pub use client::{FeedClient, Subscription};
pub use manager::{Command, SocketState, SubscriptionManager};
pub use registry::{Handle, Registry};
