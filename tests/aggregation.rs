//! Store-level properties: dedup, field preservation, drops, classification.

use std::sync::Arc;

use dronetrack::engine::selectors::{all_tracks, authorized_count, selected_track, unauthorized_count};
use dronetrack::engine::{ManualClock, Outcome, Selectors, Store, TrackUpdate};

fn store() -> (Store, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    (Store::with_clock(Arc::clone(&clock)), clock)
}

#[test]
fn duplicate_position_yields_single_path_point() {
    let (mut store, clock) = store();
    store.upsert(TrackUpdate::new("A1").at(3.0, 4.0));
    let first = store.snapshot().get("A1").unwrap().last_timestamp;
    clock.advance(250);
    store.upsert(TrackUpdate::new("A1").at(3.0, 4.0));

    let snap = store.snapshot();
    let track = snap.get("A1").unwrap();
    assert_eq!(track.path.len(), 1);
    assert!(track.last_timestamp > first);
}

#[test]
fn altitude_only_update_preserves_other_fields() {
    let (mut store, _) = store();
    store.upsert(
        TrackUpdate::new("A1")
            .registration("SD-B001")
            .name("Hawk")
            .pilot("Rae")
            .organization("Survey Co")
            .at(10.0, 20.0),
    );
    store.upsert(TrackUpdate::new("A1").altitude(75.0));

    let snap = store.snapshot();
    let t = snap.get("A1").unwrap();
    assert_eq!(t.registration, "SD-B001");
    assert_eq!(t.name, "Hawk");
    assert_eq!(t.pilot, "Rae");
    assert_eq!(t.organization, "Survey Co");
    assert_eq!(t.coord, [10.0, 20.0]);
    assert_eq!(t.altitude, 75.0);
}

#[test]
fn missing_serial_never_mutates_registry() {
    let (mut store, _) = store();
    store.upsert(TrackUpdate::new("A1"));
    let before = store.snapshot();

    let mut nameless = TrackUpdate::default().registration("SD-B002").at(1.0, 1.0);
    assert_eq!(store.upsert(nameless.clone()), Outcome::Dropped);
    nameless.serial = Some(String::new());
    assert_eq!(store.upsert(nameless), Outcome::Dropped);

    let after = store.snapshot();
    assert_eq!(after.len(), 1);
    assert_eq!(after.version, before.version);
    assert_eq!(after.digest(), before.digest());
}

#[test]
fn path_length_counts_distinct_from_predecessor() {
    let (mut store, clock) = store();
    let points = [
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 0.0],
        [0.0, 0.0],
        [1.0, 0.0],
    ];
    for [x, y] in points {
        clock.advance(1);
        store.upsert(TrackUpdate::new("P").at(x, y));
    }
    let snap = store.snapshot();
    assert_eq!(
        snap.get("P").unwrap().path.to_vec(),
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]
    );
}

#[test]
fn classification_partitions_every_snapshot() {
    let (mut store, _) = store();
    let regs = ["SD-B001", "", "sd-b002", "SD-B", "XX-9", "SD-B77"];
    for (i, reg) in regs.iter().enumerate() {
        store.upsert(TrackUpdate::new(format!("T{}", i)).registration(*reg));
        let snap = store.snapshot();
        assert_eq!(authorized_count(&snap) + unauthorized_count(&snap), snap.len());
    }
    let snap = store.snapshot();
    assert_eq!(authorized_count(&snap), 2);
    assert_eq!(unauthorized_count(&snap), 4);
}

#[test]
fn selecting_unknown_serial_resolves_not_found() {
    let (mut store, _) = store();
    store.upsert(TrackUpdate::new("A1"));
    store.select("X");
    let snap = store.snapshot();
    assert_eq!(snap.selected_serial.as_deref(), Some("X"));
    assert!(selected_track(&snap).is_none());

    store.select("A1");
    assert_eq!(selected_track(&store.snapshot()).unwrap().serial, "A1");
}

#[test]
fn end_to_end_scenario() {
    let (mut store, clock) = store();
    store.upsert(TrackUpdate::new("A1").registration("SD-B001").at(1.0, 1.0));
    clock.advance(1);
    store.upsert(TrackUpdate::new("A1").at(1.0, 1.0));
    clock.advance(1);
    store.upsert(TrackUpdate::new("A1").at(2.0, 2.0).altitude(50.0));

    let snap = store.snapshot();
    let t = snap.get("A1").unwrap();
    assert_eq!(t.path.to_vec(), vec![[1.0, 1.0], [2.0, 2.0]]);
    assert_eq!(t.altitude, 50.0);
    assert_eq!(t.registration, "SD-B001");
    assert_eq!(t.first_timestamp, 1_000);
    assert_eq!(t.last_timestamp, 1_002);
}

#[test]
fn all_tracks_in_first_appearance_order() {
    let (mut store, clock) = store();
    for serial in ["C", "A", "B"] {
        clock.advance(1);
        store.upsert(TrackUpdate::new(serial));
    }
    clock.advance(1);
    store.upsert(TrackUpdate::new("C").altitude(1.0));

    let serials: Vec<_> = all_tracks(&store.snapshot())
        .iter()
        .map(|t| t.serial.clone())
        .collect();
    assert_eq!(serials, vec!["C", "A", "B"]);
}

#[test]
fn memoized_selectors_track_snapshot_changes() {
    let (mut store, _) = store();
    let selectors = Selectors::new();
    store.upsert(TrackUpdate::new("A").registration("SD-B1"));

    let a = selectors.all_tracks(&store.snapshot());
    let b = selectors.all_tracks(&store.snapshot());
    assert!(Arc::ptr_eq(&a, &b));

    store.upsert(TrackUpdate::new("B"));
    let c = selectors.all_tracks(&store.snapshot());
    assert_eq!(c.len(), 2);
    assert_eq!(selectors.unauthorized_count(&store.snapshot()), 1);
    // Older snapshot contents are untouched.
    assert_eq!(a.len(), 1);
}

#[test]
fn empty_strings_through_store_keep_fields() {
    let (mut store, clock) = store();
    store.upsert(
        TrackUpdate::new("A1")
            .registration("SD-B001")
            .name("Falcon")
            .pilot("Sam")
            .organization("Acme"),
    );
    clock.advance(1);
    store.upsert(
        TrackUpdate::new("A1")
            .registration("")
            .name("")
            .pilot("")
            .organization(""),
    );

    let snap = store.snapshot();
    let t = snap.get("A1").unwrap();
    assert_eq!(t.registration, "SD-B001");
    assert_eq!(t.name, "Falcon");
    assert_eq!(t.pilot, "Sam");
    assert_eq!(t.organization, "Acme");
    assert!(t.is_authorized());
}
