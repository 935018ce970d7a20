//! Pure reducer: (State, Action, now) -> Outcome
//!
//! All state transitions happen here. The reducer is total: malformed input
//! degrades to a no-op, never an error, and nothing here performs I/O.

use super::events::{Action, Timestamp};
use super::state::{EngineState, Upserted};

/// What a single action did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { serial: String },
    Updated { serial: String, path_extended: bool },
    /// Update without a usable serial; state untouched.
    Dropped,
    Selected { serial: String },
    SelectionCleared,
}

/// Result of processing an action
#[derive(Debug)]
pub struct ReducerOutput {
    pub outcome: Outcome,
    /// False only when the action left the state exactly as it was.
    pub changed: bool,
}

pub fn reduce(state: &mut EngineState, action: Action, now: Timestamp) -> ReducerOutput {
    let outcome = match action {
        Action::Upsert(update) => {
            let Some(serial) = update.key().map(str::to_string) else {
                return ReducerOutput {
                    outcome: Outcome::Dropped,
                    changed: false,
                };
            };
            // Arrival order is the only order; the clock may not step back.
            state.now = state.now.max(now);
            match state.registry.upsert(&serial, update, state.now) {
                Upserted::Created => Outcome::Created { serial },
                Upserted::Updated { path_extended } => Outcome::Updated {
                    serial,
                    path_extended,
                },
            }
        }
        Action::Select(serial) => {
            state.selection.select(serial.clone());
            Outcome::Selected { serial }
        }
        Action::ClearSelection => {
            state.selection.clear();
            Outcome::SelectionCleared
        }
    };

    state.version += 1;
    ReducerOutput {
        outcome,
        changed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::TrackUpdate;

    fn upsert(state: &mut EngineState, u: TrackUpdate, now: Timestamp) -> ReducerOutput {
        reduce(state, Action::Upsert(u), now)
    }

    #[test]
    fn test_drop_on_missing_serial() {
        let mut state = EngineState::new();
        upsert(&mut state, TrackUpdate::new("A1"), 1);
        let before = state.version;

        let out = upsert(&mut state, TrackUpdate::default().altitude(5.0), 2);
        assert_eq!(out.outcome, Outcome::Dropped);
        assert!(!out.changed);
        let out = upsert(&mut state, TrackUpdate::new("").at(3.0, 3.0), 3);
        assert_eq!(out.outcome, Outcome::Dropped);

        assert_eq!(state.registry.len(), 1);
        assert_eq!(state.version, before);
        assert_eq!(state.now, 1);
    }

    #[test]
    fn test_duplicate_position_advances_timestamp_only() {
        let mut state = EngineState::new();
        upsert(&mut state, TrackUpdate::new("A1").at(4.0, 5.0), 10);
        let out = upsert(&mut state, TrackUpdate::new("A1").at(4.0, 5.0), 20);
        assert_eq!(
            out.outcome,
            Outcome::Updated {
                serial: "A1".into(),
                path_extended: false
            }
        );
        let t = state.registry.get("A1").unwrap();
        assert_eq!(t.path.len(), 1);
        assert_eq!(t.first_timestamp, 10);
        assert_eq!(t.last_timestamp, 20);
    }

    #[test]
    fn test_field_preservation() {
        let mut state = EngineState::new();
        upsert(
            &mut state,
            TrackUpdate::new("A1")
                .registration("SD-B001")
                .name("Falcon")
                .pilot("Sam")
                .organization("Acme")
                .yaw(45.0)
                .at(1.0, 1.0),
            1,
        );
        upsert(&mut state, TrackUpdate::new("A1").altitude(120.0), 2);

        let t = state.registry.get("A1").unwrap();
        assert_eq!(t.registration, "SD-B001");
        assert_eq!(t.name, "Falcon");
        assert_eq!(t.pilot, "Sam");
        assert_eq!(t.organization, "Acme");
        assert_eq!(t.yaw, 45.0);
        assert_eq!(t.coord, [1.0, 1.0]);
        assert_eq!(t.altitude, 120.0);
        assert_eq!(t.path.len(), 1);
    }

    #[test]
    fn test_clock_step_back_is_clamped() {
        let mut state = EngineState::new();
        upsert(&mut state, TrackUpdate::new("A1"), 500);
        upsert(&mut state, TrackUpdate::new("A1").at(1.0, 0.0), 400);
        let t = state.registry.get("A1").unwrap();
        assert_eq!(t.last_timestamp, 500);
        assert_eq!(state.now, 500);
    }

    #[test]
    fn test_select_unknown_serial() {
        let mut state = EngineState::new();
        let out = reduce(&mut state, Action::Select("X".into()), 1);
        assert!(out.changed);
        assert_eq!(state.selection.selected(), Some("X"));
        assert!(state.snapshot().selected().is_none());

        reduce(&mut state, Action::ClearSelection, 2);
        assert!(state.selection.selected().is_none());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut state = EngineState::new();
        upsert(&mut state, TrackUpdate::new("A1").registration("SD-B001").at(1.0, 1.0), 1);
        upsert(&mut state, TrackUpdate::new("A1").at(1.0, 1.0), 2);
        upsert(&mut state, TrackUpdate::new("A1").at(2.0, 2.0).altitude(50.0), 3);

        let t = state.registry.get("A1").unwrap();
        assert_eq!(t.path.to_vec(), vec![[1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(t.altitude, 50.0);
        assert_eq!(t.registration, "SD-B001");
    }
}
