//! Structured JSON-line logging.
//!
//! Every record is a single JSON object on stdout:
//! `{ts, run_id, seq, lvl, component, event, msg, serial?, data}`.
//! When `LOG_DIR` is set, records are also appended to
//! `<LOG_DIR>/<run_id>/events.jsonl` (trace/debug go to `trace.jsonl`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::engine::FleetStats;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "fatal" => Some(Level::Fatal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Feed,      // Transport, decoding
    Store,     // Track creation, updates, drops
    Selection, // Selected-track changes
    System,    // Startup, shutdown, summaries
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Feed => "feed",
            Domain::Store => "store",
            Domain::Selection => "selection",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    files: Option<RunFiles>,
}

#[derive(Debug)]
struct RunFiles {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let files = std::env::var("LOG_DIR")
            .ok()
            .and_then(|base| open_run_files(PathBuf::from(base).join(&run_id), &run_id));
        RunContext { run_id, files }
    })
}

fn open_run_files(run_dir: PathBuf, run_id: &str) -> Option<RunFiles> {
    if let Err(err) = create_dir_all(&run_dir) {
        eprintln!("[log] failed to create run dir: {}", err);
        return None;
    }
    let _ = std::fs::write(
        run_dir.join("manifest.json"),
        json!({
            "run_id": run_id,
            "ts": ts_now(),
            "pid": process::id(),
            "log_dir": run_dir.to_string_lossy(),
        })
        .to_string(),
    );
    let open = |name: &str| match File::create(run_dir.join(name)) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", name, err);
            None
        }
    };
    Some(RunFiles {
        events: open("events.jsonl")?,
        trace: open("trace.jsonl")?,
    })
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["serial", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn build_record(
    run_id: &str,
    level: Level,
    component: &str,
    event: &str,
    fields: Map<String, Value>,
) -> Value {
    let (mut top, data) = split_fields(fields);
    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, level, component, event, fields).to_string();
    if let Some(files) = &ctx.files {
        match level {
            Level::Trace | Level::Debug => write_line(&files.trace, &line),
            _ => write_line(&files.events, &line),
        }
    }
    println!("{}", line);
}

// =============================================================================
// Domain helpers
// =============================================================================

pub fn log_track_created(serial: &str) {
    log(
        Level::Info,
        Domain::Store,
        "track.created",
        obj(&[("serial", v_str(serial))]),
    );
}

pub fn log_event_dropped(reason: &str) {
    log(
        Level::Debug,
        Domain::Store,
        "store.event_dropped",
        obj(&[("reason", v_str(reason))]),
    );
}

pub fn log_decode_error(err: &dyn std::fmt::Display, bytes: usize) {
    log(
        Level::Warn,
        Domain::Feed,
        "feed.decode_error",
        obj(&[("msg", v_str(&err.to_string())), ("bytes", json!(bytes))]),
    );
}

pub fn log_fleet_summary(stats: &FleetStats, version: u64, selected: Option<&str>) {
    log(
        Level::Info,
        Domain::System,
        "fleet.summary",
        obj(&[
            ("total", json!(stats.total)),
            ("authorized", json!(stats.authorized)),
            ("unauthorized", json!(stats.unauthorized)),
            ("active", json!(stats.active)),
            ("version", json!(version)),
            ("selected", json!(selected)),
        ]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Tests
// =============================================================================
