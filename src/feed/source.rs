use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::logging::{log, obj, v_str, Domain, Level};

/// A stream of raw feed messages. `Ok(None)` means the source has closed.
#[async_trait]
pub trait FeedSource: Send {
    async fn next_message(&mut self) -> Result<Option<String>>;

    fn describe(&self) -> String;
}

/// Newline-delimited JSON over any buffered reader (files, stdin).
pub struct LineSource<R> {
    lines: Lines<R>,
    label: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FeedSource for LineSource<R> {
    async fn next_message(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("lines:{}", self.label)
    }
}

/// Text frames from a WebSocket. No reconnection: a close ends the source.
pub struct WsSource {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: Url,
}

impl WsSource {
    pub async fn connect(url: Url) -> Result<Self> {
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .with_context(|| format!("connect {}", url))?;
        log(
            Level::Info,
            Domain::Feed,
            "feed.connected",
            obj(&[("url", v_str(url.as_str()))]),
        );
        Ok(Self { ws, url })
    }
}

#[async_trait]
impl FeedSource for WsSource {
    async fn next_message(&mut self) -> Result<Option<String>> {
        while let Some(msg) = self.ws.next().await {
            match msg? {
                WsMessage::Text(text) => return Ok(Some(text)),
                WsMessage::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => log(
                        Level::Warn,
                        Domain::Feed,
                        "feed.non_utf8_frame",
                        obj(&[("url", v_str(self.url.as_str()))]),
                    ),
                },
                WsMessage::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("ws:{}", self.url)
    }
}

/// In-process source fed by a channel.
pub struct ChannelSource {
    rx: mpsc::Receiver<String>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl FeedSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Option<String>> {
        Ok(self.rx.recv().await)
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}
