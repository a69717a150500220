//! SSE client for the listing price feed
//!
//! Handles connection, event-stream framing, and payload extraction.

use bytes::{Bytes, BytesMut};
use futures_util::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send + Sync + 'static>>;

/// Client for a single server-sent-event connection
pub struct SseClient {
    endpoint: String,
    connect_timeout: Duration,
    stream: Option<ByteStream>,
    buffer: BytesMut,
}

impl SseClient {
    /// Create a new SSE client
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            connect_timeout,
            stream: None,
            buffer: BytesMut::new(),
        }
    }

    /// Connect to the feed endpoint
    pub async fn connect(&mut self) -> Result<()> {
        // No overall request timeout: the stream is long-lived and events
        // may be arbitrarily far apart.
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        info!(endpoint = %self.endpoint, "Connecting to listing price feed");

        let response = client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| FeedError::Connect(format!("failed to connect: {e}")))?
            .error_for_status()
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        info!(status = ?response.status(), "Feed connected");

        self.stream = Some(Box::pin(response.bytes_stream()));
        self.buffer.clear();

        Ok(())
    }

    /// Receive the next event payload.
    ///
    /// `Ok(Some(payload))` is one event's data; `Ok(None)` is a comment or
    /// keep-alive block. Stream end maps to `StreamClosed`.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        if self.stream.is_none() {
            return Err(FeedError::Connect("not connected".to_string()));
        }

        loop {
            if let Some(block) = take_event_block(&mut self.buffer) {
                return match event_data(&block) {
                    Some(payload) => {
                        debug!(len = payload.len(), "Received event");
                        Ok(Some(payload))
                    }
                    None => {
                        debug!("Received keep-alive block");
                        Ok(None)
                    }
                };
            }

            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| FeedError::Connect("not connected".to_string()))?;

            match stream.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Feed transport error");
                    self.stream = None;
                    return Err(FeedError::Transport(e.to_string()));
                }
                None => {
                    info!("Feed stream ended");
                    self.stream = None;
                    return Err(FeedError::StreamClosed);
                }
            }
        }
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Release the connection. Idempotent; dropping the body stream is the
    /// release for an SSE connection (there is no close handshake).
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            info!("Feed connection released");
        }
        self.buffer.clear();
    }
}

/// Split one event block off the front of the buffer, if a full block
/// (terminated by a blank line, LF or CRLF) has arrived.
fn take_event_block(buffer: &mut BytesMut) -> Option<String> {
    let lf = find_subsequence(buffer, b"\n\n").map(|at| (at, 2));
    let crlf = find_subsequence(buffer, b"\r\n\r\n").map(|at| (at, 4));

    let (at, delimiter_len) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if b.0 < a.0 {
                b
            } else {
                a
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let block = buffer.split_to(at + delimiter_len);
    Some(String::from_utf8_lossy(&block[..at]).into_owned())
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extract the payload from an event block: `data` lines joined with
/// newlines. Comment lines and non-data fields (`event`, `id`, `retry`)
/// are ignored. A block with no data lines is a keep-alive.
fn event_data(block: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            data_lines.push(value);
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_from(raw: &str) -> BytesMut {
        BytesMut::from(raw.as_bytes())
    }

    #[test]
    fn test_take_event_block_lf() {
        let mut buffer = buffer_from("data:{\"id\":1}\n\ndata:{\"id\":2}\n\n");

        assert_eq!(take_event_block(&mut buffer).unwrap(), "data:{\"id\":1}");
        assert_eq!(take_event_block(&mut buffer).unwrap(), "data:{\"id\":2}");
        assert!(take_event_block(&mut buffer).is_none());
    }

    #[test]
    fn test_take_event_block_crlf() {
        let mut buffer = buffer_from("data: {\"id\":1}\r\n\r\n");

        assert_eq!(take_event_block(&mut buffer).unwrap(), "data: {\"id\":1}");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_event_block_waits_for_terminator() {
        let mut buffer = buffer_from("data:{\"id\":1}");
        assert!(take_event_block(&mut buffer).is_none());

        buffer.extend_from_slice(b"\n\n");
        assert_eq!(take_event_block(&mut buffer).unwrap(), "data:{\"id\":1}");
    }

    #[test]
    fn test_event_data_strips_field_and_optional_space() {
        assert_eq!(event_data("data:{\"id\":1}").as_deref(), Some("{\"id\":1}"));
        assert_eq!(event_data("data: {\"id\":1}").as_deref(), Some("{\"id\":1}"));
    }

    #[test]
    fn test_event_data_joins_multi_line_payloads() {
        assert_eq!(
            event_data("data: line one\ndata: line two").as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn test_event_data_ignores_comments_and_other_fields() {
        assert!(event_data(": keep-alive").is_none());
        assert!(event_data("event: update\nid: 42\nretry: 500").is_none());
        assert_eq!(
            event_data("event: update\ndata: payload").as_deref(),
            Some("payload")
        );
    }

    #[test]
    fn test_event_data_crlf_lines() {
        assert_eq!(
            event_data("data: one\r\ndata: two\r").as_deref(),
            Some("one\ntwo")
        );
    }
}
