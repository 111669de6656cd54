//! Access-token models and the shared single-token cache.

pub mod cache;
pub mod secret;

pub use cache::*;
pub use secret::*;
