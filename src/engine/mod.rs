//! Live track aggregation engine.
//!
//! Architecture:
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Feed        │────►│  Action chan │────►│   Reducer    │
//! │  (WS/JSONL)  │     │  (ordered)   │     │  (pure fn)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                                  │
//!                                                  ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │  Selectors   │◄────│  Snapshot    │
//!                      │  (memoized)  │     │  (watch)     │
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! Tracks are never removed. The selection is a bare serial that may point
//! at nothing; readers resolve it against the snapshot they hold.

pub mod events;
pub mod path;
pub mod state;
pub mod reducer;
pub mod store;
pub mod selectors;

pub use events::{Action, Coord, Timestamp, TrackUpdate};
pub use path::Path;
pub use reducer::Outcome;
pub use selectors::{FleetStats, Selectors};
pub use state::{Snapshot, Track};
pub use store::{run_store, Clock, ManualClock, Store, SystemClock};
