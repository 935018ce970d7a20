//! Derived read-only views over a [`Snapshot`].
//!
//! The free functions are pure and recompute on every call. [`Selectors`]
//! wraps the list and count views in a cache keyed on snapshot identity, so
//! repeated reads of an unchanged snapshot hand back the same `Arc`.

use std::sync::{Arc, Mutex};

use crate::classify::is_authorized;

use super::events::Timestamp;
use super::state::{Snapshot, Track, TrackMap};

/// Authorization split and activity over one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetStats {
    pub total: usize,
    pub authorized: usize,
    pub unauthorized: usize,
    /// Tracks heard from within the active window.
    pub active: usize,
}

/// All tracks in order of first appearance.
pub fn all_tracks(snapshot: &Snapshot) -> Vec<Arc<Track>> {
    snapshot.iter().cloned().collect()
}

pub fn selected_track(snapshot: &Snapshot) -> Option<Arc<Track>> {
    snapshot.selected().cloned()
}

pub fn authorized_count(snapshot: &Snapshot) -> usize {
    snapshot.iter().filter(|t| is_authorized(&t.registration)).count()
}

pub fn unauthorized_count(snapshot: &Snapshot) -> usize {
    snapshot.len() - authorized_count(snapshot)
}

/// The last `n` tracks by first appearance.
pub fn recent_tracks(snapshot: &Snapshot, n: usize) -> Vec<Arc<Track>> {
    let skip = snapshot.len().saturating_sub(n);
    snapshot.iter().skip(skip).cloned().collect()
}

/// Tracks whose last update is no older than `window_ms` before `now`.
pub fn active_tracks(snapshot: &Snapshot, now: Timestamp, window_ms: u64) -> Vec<Arc<Track>> {
    snapshot
        .iter()
        .filter(|t| is_active(t, now, window_ms))
        .cloned()
        .collect()
}

pub fn fleet_stats(snapshot: &Snapshot, now: Timestamp, window_ms: u64) -> FleetStats {
    let authorized = authorized_count(snapshot);
    FleetStats {
        total: snapshot.len(),
        authorized,
        unauthorized: snapshot.len() - authorized,
        active: snapshot.iter().filter(|t| is_active(t, now, window_ms)).count(),
    }
}

fn is_active(track: &Track, now: Timestamp, window_ms: u64) -> bool {
    now.saturating_sub(track.last_timestamp) <= window_ms
}

/// Most recently heard first. For list rendering; never applied inside the store.
pub fn by_last_seen(tracks: &[Arc<Track>]) -> Vec<Arc<Track>> {
    let mut sorted = tracks.to_vec();
    sorted.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
    sorted
}

/// Single-slot cache keyed on the identity of the input `Arc`.
#[derive(Debug)]
struct Memo<K, V> {
    slot: Mutex<Option<(Arc<K>, Arc<V>)>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<K, V> Memo<K, V> {
    fn get_or_compute(&self, key: &Arc<K>, compute: impl FnOnce(&K) -> V) -> Arc<V> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((cached_key, value)) = slot.as_ref() {
            if Arc::ptr_eq(cached_key, key) {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(compute(key));
        *slot = Some((Arc::clone(key), Arc::clone(&value)));
        value
    }
}

/// Memoized selectors. Track-derived views are keyed on the track map, so a
/// selection change alone does not invalidate them.
#[derive(Debug, Default)]
pub struct Selectors {
    all: Memo<TrackMap, Vec<Arc<Track>>>,
    counts: Memo<TrackMap, (usize, usize)>,
}

impl Selectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_tracks(&self, snapshot: &Snapshot) -> Arc<Vec<Arc<Track>>> {
        self.all
            .get_or_compute(&snapshot.tracks, |map| map.values().cloned().collect())
    }

    fn counts(&self, snapshot: &Snapshot) -> Arc<(usize, usize)> {
        self.counts.get_or_compute(&snapshot.tracks, |map| {
            let authorized = map.values().filter(|t| is_authorized(&t.registration)).count();
            (authorized, map.len() - authorized)
        })
    }

    pub fn authorized_count(&self, snapshot: &Snapshot) -> usize {
        self.counts(snapshot).0
    }

    pub fn unauthorized_count(&self, snapshot: &Snapshot) -> usize {
        self.counts(snapshot).1
    }

    pub fn selected_track(&self, snapshot: &Snapshot) -> Option<Arc<Track>> {
        selected_track(snapshot)
    }
}
