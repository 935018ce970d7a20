//! Inputs to the reducer.

/// Epoch milliseconds.
pub type Timestamp = u64;

/// Horizontal position `[x, y]` as delivered by the feed.
pub type Coord = [f64; 2];

/// One decoded positional/attribute update for a single track.
///
/// Every field except `serial` is optional; absent fields keep whatever the
/// track already holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    pub serial: Option<String>,
    pub registration: Option<String>,
    pub name: Option<String>,
    pub pilot: Option<String>,
    pub organization: Option<String>,
    pub altitude: Option<f64>,
    pub yaw: Option<f64>,
    pub coord: Option<Coord>,
}

impl TrackUpdate {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: Some(serial.into()),
            ..Default::default()
        }
    }

    pub fn registration(mut self, registration: impl Into<String>) -> Self {
        self.registration = Some(registration.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pilot(mut self, pilot: impl Into<String>) -> Self {
        self.pilot = Some(pilot.into());
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn yaw(mut self, yaw: f64) -> Self {
        self.yaw = Some(yaw);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.coord = Some([x, y]);
        self
    }

    /// The identifier if present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.serial.as_deref().filter(|s| !s.is_empty())
    }
}

/// Mutations accepted by the store, applied strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Upsert(TrackUpdate),
    Select(String),
    ClearSelection,
}

impl Action {
    /// True for actions the reducer discards without touching state.
    pub fn is_noop(&self) -> bool {
        matches!(self, Action::Upsert(u) if u.key().is_none())
    }
}

impl From<TrackUpdate> for Action {
    fn from(update: TrackUpdate) -> Self {
        Action::Upsert(update)
    }
}
