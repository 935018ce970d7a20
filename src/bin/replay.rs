//! Replay a JSONL feature log through a fresh store.
//!
//! Usage: `replay [FILE]` (stdin when omitted). `SELECT=<serial>` selects a
//! track after the last message. Prints one summary line including the
//! snapshot digest, so two runs over the same log can be compared.

use std::env;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{stdin, BufReader};

use dronetrack::engine::selectors::{authorized_count, unauthorized_count};
use dronetrack::engine::{Outcome, Store};
use dronetrack::feed::geojson;
use dronetrack::feed::{FeedSource, LineSource};
use dronetrack::logging::log_decode_error;

#[derive(Debug, Default)]
struct Tally {
    messages: u64,
    bad_messages: u64,
    created: u64,
    updated: u64,
    dropped: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut source: Box<dyn FeedSource> = match env::args().nth(1) {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("open {}", path))?;
            Box::new(LineSource::new(BufReader::new(file), path))
        }
        None => Box::new(LineSource::new(BufReader::new(stdin()), "stdin")),
    };

    let mut store = Store::new();
    let mut tally = Tally::default();

    while let Some(text) = source.next_message().await? {
        tally.messages += 1;
        let updates = match geojson::decode(&text) {
            Ok(u) => u,
            Err(err) => {
                tally.bad_messages += 1;
                log_decode_error(&err, text.len());
                continue;
            }
        };
        for update in updates {
            match store.upsert(update) {
                Outcome::Created { .. } => tally.created += 1,
                Outcome::Updated { .. } => tally.updated += 1,
                Outcome::Dropped => tally.dropped += 1,
                _ => {}
            }
        }
    }

    if let Ok(serial) = env::var("SELECT") {
        store.select(serial);
    }

    let snap = store.snapshot();
    let selected = snap.selected().map(|t| {
        json!({
            "serial": t.serial,
            "registration": t.registration,
            "path_len": t.path.len(),
            "coord": t.coord,
        })
    });
    println!(
        "{}",
        json!({
            "messages": tally.messages,
            "bad_messages": tally.bad_messages,
            "created": tally.created,
            "updated": tally.updated,
            "dropped": tally.dropped,
            "tracks": snap.len(),
            "authorized": authorized_count(&snap),
            "unauthorized": unauthorized_count(&snap),
            "selected_serial": snap.selected_serial,
            "selected": selected,
            "digest": snap.digest(),
        })
    );
    Ok(())
}
