use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration};

use dronetrack::classify::Class;
use dronetrack::config::Config;
use dronetrack::engine::selectors::{by_last_seen, fleet_stats, recent_tracks};
use dronetrack::engine::{run_store, Snapshot, Store};
use dronetrack::feed::{pump, WsSource};
use dronetrack::logging::{log, log_fleet_summary, obj, ts_epoch_ms, v_str, Domain, Level};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().validated();
    let url = cfg.feed_url()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("feed_url", v_str(url.as_str())),
            ("summary_secs", json!(cfg.summary_secs)),
            ("active_window_secs", json!(cfg.active_window_secs)),
        ]),
    );

    let store = Store::new();
    let snapshots = store.subscribe();
    let (tx, rx) = mpsc::channel(cfg.action_buffer);
    let store_task = tokio::spawn(run_store(store, rx));
    let summary_task = tokio::spawn(summarize(snapshots, cfg.clone()));

    let mut source = WsSource::connect(url).await?;
    tokio::select! {
        res = pump(&mut source, &tx) => {
            if let Err(err) = res {
                log(Level::Error, Domain::Feed, "feed.error", obj(&[("msg", v_str(&err.to_string()))]));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log(Level::Info, Domain::System, "shutdown.signal", obj(&[]));
        }
    }
    drop(tx);

    // Closing the feed stops mutation; the aggregated state stays readable.
    let store = store_task.await?;
    summary_task.abort();
    report(&store.snapshot(), &cfg);
    Ok(())
}

async fn summarize(mut snapshots: watch::Receiver<Arc<Snapshot>>, cfg: Config) {
    let mut tick = interval(Duration::from_secs(cfg.summary_secs));
    loop {
        tick.tick().await;
        if snapshots.has_changed().is_err() {
            break;
        }
        let snap = snapshots.borrow_and_update().clone();
        let stats = fleet_stats(&snap, ts_epoch_ms(), cfg.active_window_ms());
        log_fleet_summary(&stats, snap.version, snap.selected_serial.as_deref());
    }
}

fn report(snap: &Snapshot, cfg: &Config) {
    let stats = fleet_stats(snap, ts_epoch_ms(), cfg.active_window_ms());
    log_fleet_summary(&stats, snap.version, snap.selected_serial.as_deref());

    for track in by_last_seen(&recent_tracks(snap, cfg.recent_limit)) {
        log(
            Level::Info,
            Domain::System,
            "fleet.track",
            obj(&[
                ("serial", v_str(&track.serial)),
                ("registration", v_str(&track.registration)),
                ("name", v_str(&track.name)),
                ("class", v_str(Class::of(&track.registration).as_str())),
                ("altitude", json!(track.altitude)),
                ("path_len", json!(track.path.len())),
                ("last_ts", json!(track.last_timestamp)),
            ]),
        );
    }
}
