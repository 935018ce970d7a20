//! Live drone track aggregation.
//!
//! Turns an unordered, possibly duplicated, possibly partial stream of
//! GeoJSON updates into a per-serial track registry with deduplicated path
//! history, a selected-track pointer, and memoized read views.

pub mod classify;
pub mod config;
pub mod engine;
pub mod feed;
pub mod logging;
