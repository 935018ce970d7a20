//! Inbound message feed: transport, wire decoding, and the pump into the store.

pub mod geojson;
pub mod pump;
pub mod source;

pub use pump::{pump, PumpStats};
pub use source::{ChannelSource, FeedSource, LineSource, WsSource};
