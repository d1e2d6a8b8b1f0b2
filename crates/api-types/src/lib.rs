//! Wire types shared between the OreCart clients and the backend.

pub mod feed;
pub mod rest;

pub use feed::*;
pub use rest::*;
