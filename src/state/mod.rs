//! Process-lifetime shared state.
//!
//! Both stores are internally synchronized and meant to be shared through an
//! `Arc` between the orchestrator and the connection handlers.

pub mod skin_cache;
pub mod tracker;

pub use skin_cache::SkinCache;
pub use tracker::RestorationTracker;
