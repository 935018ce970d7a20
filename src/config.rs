use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub summary_secs: u64,
    pub active_window_secs: u64,
    pub recent_limit: usize,
    pub action_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: "ws://127.0.0.1:4001/ws".to_string(),
            summary_secs: 10,
            active_window_secs: 30,
            recent_limit: 10,
            action_buffer: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            feed_url: std::env::var("FEED_URL").unwrap_or(d.feed_url),
            summary_secs: std::env::var("SUMMARY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.summary_secs),
            active_window_secs: std::env::var("ACTIVE_WINDOW_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.active_window_secs),
            recent_limit: std::env::var("RECENT_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.recent_limit),
            action_buffer: std::env::var("ACTION_BUFFER").ok().and_then(|v| v.parse().ok()).unwrap_or(d.action_buffer),
        }
    }

    pub fn active_window_ms(&self) -> u64 {
        self.active_window_secs.saturating_mul(1000)
    }

    /// Parsed feed URL; only `ws` and `wss` are accepted.
    pub fn feed_url(&self) -> Result<Url> {
        let url = Url::parse(&self.feed_url)
            .with_context(|| format!("invalid FEED_URL {:?}", self.feed_url))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => anyhow::bail!("unsupported feed scheme {:?}", other),
        }
    }

    /// Floors applied before use: a zero buffer or interval would stall the loop.
    pub fn validated(mut self) -> Self {
        self.summary_secs = self.summary_secs.max(1);
        self.action_buffer = self.action_buffer.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_scheme() {
        let mut cfg = Config::default();
        assert!(cfg.feed_url().is_ok());
        cfg.feed_url = "http://example.com/feed".to_string();
        assert!(cfg.feed_url().is_err());
        cfg.feed_url = "not a url".to_string();
        assert!(cfg.feed_url().is_err());
    }

    #[test]
    fn test_validated_floors() {
        let cfg = Config {
            summary_secs: 0,
            action_buffer: 0,
            ..Config::default()
        }
        .validated();
        assert_eq!(cfg.summary_secs, 1);
        assert_eq!(cfg.action_buffer, 1);
        assert_eq!(cfg.active_window_ms(), 30_000);
    }
}
