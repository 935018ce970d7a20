//! Emit a seeded pseudo-random feature stream on stdout, one
//! `FeatureCollection` per line, for piping into `replay`.
//!
//! Env: `SEED` (default 42), `EVENTS` (default 200), `DRONES` (default 5).
//! The stream mixes duplicate positions, partial updates, and messages with
//! no serial.

use std::env;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn main() {
    let seed: u64 = env_or("SEED", 42);
    let events: u64 = env_or("EVENTS", 200);
    let drones: usize = env_or("DRONES", 5).max(1);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut positions: Vec<[f64; 2]> = (0..drones)
        .map(|_| [rng.gen_range(35.0..36.0), rng.gen_range(31.0..32.0)])
        .collect();

    for _ in 0..events {
        let idx = rng.gen_range(0..drones);
        let roll: u32 = rng.gen_range(0..100);

        let mut props = Map::new();
        if roll >= 5 {
            props.insert("serial".into(), json!(format!("SN-{:04}", idx)));
        }
        if roll < 30 {
            let authorized = idx % 2 == 0;
            let reg = if authorized {
                format!("SD-B{:03}", idx)
            } else {
                format!("SD-{:03}", idx)
            };
            props.insert("registration".into(), json!(reg));
            props.insert("Name".into(), json!(format!("Drone {}", idx)));
            props.insert("pilot".into(), json!(format!("pilot-{}", idx)));
            props.insert("organization".into(), json!("fleet"));
        }
        if rng.gen_bool(0.7) {
            props.insert("altitude".into(), json!(rng.gen_range(0..400)));
        }
        if rng.gen_bool(0.5) {
            props.insert("yaw".into(), json!(rng.gen_range(0..360)));
        }

        // Roughly a third of updates repeat the previous position.
        let geometry = if rng.gen_bool(0.9) {
            if rng.gen_bool(0.66) {
                positions[idx][0] += rng.gen_range(-0.001..0.001);
                positions[idx][1] += rng.gen_range(-0.001..0.001);
            }
            json!({ "type": "Point", "coordinates": positions[idx] })
        } else {
            Value::Null
        };

        let msg = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": Value::Object(props),
                "geometry": geometry,
            }],
        });
        println!("{}", msg);
    }
}
