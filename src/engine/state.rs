//! Track records, the registry, selection state and immutable snapshots.

use std::sync::Arc;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::events::{Coord, Timestamp, TrackUpdate};
use super::path::Path;

/// Name given to a track that never reported one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Aggregated state for one tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub serial: String,
    pub registration: String,
    pub name: String,
    pub pilot: String,
    pub organization: String,
    pub altitude: f64,
    pub yaw: f64,
    pub coord: Coord,
    /// Trajectory, oldest first. Shares history with older snapshots.
    pub path: Path,
    pub first_timestamp: Timestamp,
    pub last_timestamp: Timestamp,
}

impl Track {
    /// Start a track with defaults, then fold in its first update.
    pub fn create(serial: String, update: TrackUpdate, now: Timestamp) -> Self {
        let mut track = Self {
            serial,
            registration: String::new(),
            name: UNKNOWN_NAME.to_string(),
            pilot: String::new(),
            organization: String::new(),
            altitude: 0.0,
            yaw: 0.0,
            coord: [0.0, 0.0],
            path: Path::new(),
            first_timestamp: now,
            last_timestamp: now,
        };
        track.apply(update, now);
        track
    }

    /// Last-write-wins merge per field. Returns true if the path grew.
    ///
    /// Empty strings and non-finite numbers count as absent.
    pub fn apply(&mut self, update: TrackUpdate, now: Timestamp) -> bool {
        let text = |v: Option<String>| v.filter(|s| !s.is_empty());
        if let Some(v) = text(update.registration) {
            self.registration = v;
        }
        if let Some(v) = text(update.name) {
            self.name = v;
        }
        if let Some(v) = text(update.pilot) {
            self.pilot = v;
        }
        if let Some(v) = text(update.organization) {
            self.organization = v;
        }
        if let Some(v) = update.altitude.filter(|v| v.is_finite()) {
            self.altitude = v;
        }
        if let Some(v) = update.yaw.filter(|v| v.is_finite()) {
            self.yaw = v;
        }
        if let Some(c) = update.coord.filter(|c| c.iter().all(|v| v.is_finite())) {
            self.coord = c;
        }
        self.last_timestamp = self.last_timestamp.max(now);
        self.record_position()
    }

    /// Adjacent dedup: append `coord` only if it differs from the last point.
    fn record_position(&mut self) -> bool {
        if self.path.last() == Some(&self.coord) {
            return false;
        }
        self.path.push(self.coord);
        true
    }

    pub fn is_authorized(&self) -> bool {
        crate::classify::is_authorized(&self.registration)
    }

    fn hash_into(&self, h: &mut Sha256) {
        for s in [
            &self.serial,
            &self.registration,
            &self.name,
            &self.pilot,
            &self.organization,
        ] {
            h.update((s.len() as u64).to_le_bytes());
            h.update(s.as_bytes());
        }
        h.update(self.altitude.to_bits().to_le_bytes());
        h.update(self.yaw.to_bits().to_le_bytes());
        h.update((self.path.len() as u64).to_le_bytes());
        for [x, y] in self.path.iter() {
            h.update(x.to_bits().to_le_bytes());
            h.update(y.to_bits().to_le_bytes());
        }
    }
}

/// Tracks keyed by serial, in order of first appearance.
pub type TrackMap = IndexMap<String, Arc<Track>>;

/// Serial -> track mapping. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tracks: Arc<TrackMap>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, serial: &str) -> Option<&Arc<Track>> {
        self.tracks.get(serial)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &Arc<TrackMap> {
        &self.tracks
    }

    /// Copy-on-write access: a map or track still held by a published
    /// snapshot is cloned before it is touched.
    pub(crate) fn upsert(&mut self, serial: &str, update: TrackUpdate, now: Timestamp) -> Upserted {
        let map = Arc::make_mut(&mut self.tracks);
        match map.get_mut(serial) {
            Some(slot) => {
                let extended = Arc::make_mut(slot).apply(update, now);
                Upserted::Updated { path_extended: extended }
            }
            None => {
                let track = Track::create(serial.to_string(), update, now);
                map.insert(serial.to_string(), Arc::new(track));
                Upserted::Created
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated { path_extended: bool },
}

/// At most one selected serial. Holds the identifier only; the track may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn select(&mut self, serial: String) {
        self.selected = Some(serial);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Resolve against a registry at read time.
    pub fn resolve<'a>(&self, registry: &'a Registry) -> Option<&'a Arc<Track>> {
        registry.get(self.selected.as_deref()?)
    }
}

/// Registry + selection + logical clock. Owned exclusively by the store.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub registry: Registry,
    pub selection: Selection,
    /// Latest application time; never moves backwards.
    pub now: Timestamp,
    /// Incremented on every state change.
    pub version: u64,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            as_of: self.now,
            tracks: Arc::clone(self.registry.tracks()),
            selected_serial: self.selection.selected().map(str::to_string),
        }
    }
}

/// Immutable view of the registry and selection at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    /// Application time of the latest change.
    pub as_of: Timestamp,
    pub tracks: Arc<TrackMap>,
    pub selected_serial: Option<String>,
}

impl Snapshot {
    pub fn get(&self, serial: &str) -> Option<&Arc<Track>> {
        self.tracks.get(serial)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.tracks.values()
    }

    /// The selected track, or `None` if nothing is selected or the serial is unknown.
    pub fn selected(&self) -> Option<&Arc<Track>> {
        self.get(self.selected_serial.as_deref()?)
    }

    /// SHA-256 over tracks (registry order, timestamps excluded) and selection.
    pub fn digest(&self) -> String {
        let mut h = Sha256::new();
        h.update((self.tracks.len() as u64).to_le_bytes());
        for track in self.tracks.values() {
            track.hash_into(&mut h);
        }
        match &self.selected_serial {
            Some(s) => {
                h.update([1u8]);
                h.update(s.as_bytes());
            }
            None => h.update([0u8]),
        }
        hex::encode(h.finalize())
    }
}
