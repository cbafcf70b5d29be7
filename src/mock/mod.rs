//! Synthetic service backends
//!
//! Deterministic rule-based generators for weather, lodging, dining and
//! routes. The local strategy calls them directly; the mock server exposes
//! the same generators over HTTP for the live strategy. All randomness comes
//! from one seedable [`SharedRng`], and every synthetic failure probability is
//! configurable.

pub mod dining;
pub mod lodging;
pub mod rng;
pub mod routes;
pub mod server;
pub mod weather;

pub use rng::SharedRng;
pub use server::{MockState, router};
