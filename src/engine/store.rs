//! The aggregation store: single owner of engine state.
//!
//! Mutation goes through `&mut self`, so one action always completes before
//! the next begins. Every state change publishes a fresh [`Snapshot`] on a
//! `watch` channel while anyone is subscribed; readers never see a
//! half-applied action.
//!
//! Snapshots are built on demand and cached until the next change. The store
//! drops its cached copy before mutating, so when no reader holds the previous
//! snapshot the registry is updated in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use serde_json::json;
use tokio::sync::{mpsc, watch};

use crate::logging::{self, obj, v_str, Domain, Level};

use super::events::{Action, Timestamp, TrackUpdate};
use super::reducer::{reduce, Outcome};
use super::state::{EngineState, Snapshot};

/// Source of application time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Timestamp;
}

/// Wall clock, epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        self.now.store(ts, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> Timestamp {
        (**self).now_ms()
    }
}

pub struct Store {
    state: EngineState,
    clock: Box<dyn Clock>,
    published: watch::Sender<Arc<Snapshot>>,
    current: OnceLock<Arc<Snapshot>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        let state = EngineState::new();
        let (published, _) = watch::channel(Arc::new(state.snapshot()));
        Self {
            state,
            clock: Box::new(clock),
            published,
            current: OnceLock::new(),
        }
    }

    pub fn upsert(&mut self, update: TrackUpdate) -> Outcome {
        self.dispatch(Action::Upsert(update))
    }

    /// Selects `serial` whether or not a track exists for it.
    pub fn select(&mut self, serial: impl Into<String>) -> Outcome {
        self.dispatch(Action::Select(serial.into()))
    }

    pub fn clear_selection(&mut self) -> Outcome {
        self.dispatch(Action::ClearSelection)
    }

    pub fn dispatch(&mut self, action: Action) -> Outcome {
        if !action.is_noop() {
            self.current.take();
        }
        let now = self.clock.now_ms();
        let out = reduce(&mut self.state, action, now);
        log_outcome(&out.outcome);
        if out.changed && self.published.receiver_count() > 0 {
            self.published.send_replace(self.snapshot());
        }
        out.outcome
    }

    /// Latest snapshot. Repeated calls between changes return the same `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(
            self.current
                .get_or_init(|| Arc::new(self.state.snapshot())),
        )
    }

    /// Observe every published snapshot, starting from the current one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.send_replace(self.snapshot());
        self.published.subscribe()
    }

    pub fn len(&self) -> usize {
        self.state.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.registry.is_empty()
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Created { serial } => logging::log_track_created(serial),
        Outcome::Dropped => logging::log_event_dropped("missing_serial"),
        Outcome::Selected { serial } => logging::log(
            Level::Info,
            Domain::Selection,
            "selection.set",
            obj(&[("serial", v_str(serial))]),
        ),
        Outcome::SelectionCleared => {
            logging::log(Level::Info, Domain::Selection, "selection.cleared", obj(&[]))
        }
        Outcome::Updated {
            serial,
            path_extended,
        } => logging::log(
            Level::Trace,
            Domain::Store,
            "track.updated",
            obj(&[
                ("serial", v_str(serial)),
                ("path_extended", json!(path_extended)),
            ]),
        ),
    }
}

/// Apply actions from `rx` strictly in arrival order until every sender is
/// gone, then hand the store back with its state intact.
pub async fn run_store(mut store: Store, mut rx: mpsc::Receiver<Action>) -> Store {
    let mut applied: u64 = 0;
    while let Some(action) = rx.recv().await {
        store.dispatch(action);
        applied += 1;
    }
    logging::log(
        Level::Info,
        Domain::Store,
        "store.input_closed",
        obj(&[
            ("applied", json!(applied)),
            ("tracks", json!(store.len())),
        ]),
    );
    store
}
