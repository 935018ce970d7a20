use anyhow::Result;
use serde_json::json;
use tokio::sync::mpsc;

use crate::engine::Action;
use crate::logging::{log, log_decode_error, obj, v_str, Domain, Level};

use super::geojson;
use super::source::FeedSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub messages: u64,
    pub updates: u64,
    pub decode_errors: u64,
}

/// Decode messages from `source` and forward them to the store in arrival
/// order. Ends when the source closes or the store side hangs up; undecodable
/// messages are logged and skipped.
pub async fn pump<S>(source: &mut S, tx: &mpsc::Sender<Action>) -> Result<PumpStats>
where
    S: FeedSource + ?Sized,
{
    let mut stats = PumpStats::default();
    'outer: while let Some(text) = source.next_message().await? {
        stats.messages += 1;
        let updates = match geojson::decode(&text) {
            Ok(u) => u,
            Err(err) => {
                stats.decode_errors += 1;
                log_decode_error(&err, text.len());
                continue;
            }
        };
        for update in updates {
            if tx.send(Action::Upsert(update)).await.is_err() {
                log(Level::Warn, Domain::Feed, "feed.store_gone", obj(&[]));
                break 'outer;
            }
            stats.updates += 1;
        }
    }

    log(
        Level::Info,
        Domain::Feed,
        "feed.closed",
        obj(&[
            ("source", v_str(&source.describe())),
            ("messages", json!(stats.messages)),
            ("updates", json!(stats.updates)),
            ("decode_errors", json!(stats.decode_errors)),
        ]),
    );
    Ok(stats)
}
