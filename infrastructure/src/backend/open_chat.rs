//! OpenAI-compatible streaming chat backend.
//!
//! Sends the session history to a `/chat/completions` endpoint with
//! `stream: true` and turns the server-sent-event response into
//! [`StreamEvent`]s. The SSE framing is parsed with a rolling buffer split
//! on blank lines, so fragments arriving across chunk boundaries are
//! reassembled correctly.

use async_trait::async_trait;
use futures::StreamExt;
use palaver_application::ports::chat_backend::{BackendError, ChatBackend, StreamHandle};
use palaver_domain::{Message, StreamEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Chat backend talking to an OpenAI-compatible HTTP API.
pub struct OpenAiChatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, history: &[Message]) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
            .collect();
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn stream_chat(&self, history: &[Message]) -> Result<StreamHandle, BackendError> {
        let mut request = self
            .client
            .post(self.completions_url())
            .json(&self.request_body(history));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Streaming completion from {} started", self.base_url);

        // The producer stops on its own when the receiver is dropped,
        // which is how an abandoned stream is cancelled.
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(pump_sse(response.bytes_stream(), tx));
        Ok(StreamHandle::new(rx))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Read the SSE body chunk by chunk and forward one [`StreamEvent`] per
/// content delta, ending with exactly one terminal event.
async fn pump_sse<S, B>(mut body: S, tx: mpsc::Sender<StreamEvent>)
where
    S: futures::Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut buffer = String::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(format!("HTTP stream error: {e}"))).await;
                return;
            }
        };
        match std::str::from_utf8(chunk.as_ref()) {
            Ok(text) => buffer.push_str(text),
            Err(e) => {
                let _ = tx
                    .send(StreamEvent::Error(format!("Invalid UTF-8 in stream: {e}")))
                    .await;
                return;
            }
        }

        while let Some((event, rest)) = split_event(&buffer) {
            let parsed = parse_event(&event);
            buffer = rest;
            match parsed {
                SseData::Delta(fragment) => {
                    if tx.send(StreamEvent::Delta(fragment)).await.is_err() {
                        // Receiver dropped: the stream was cancelled.
                        return;
                    }
                }
                SseData::Done => {
                    let _ = tx.send(StreamEvent::Completed).await;
                    return;
                }
                SseData::Skip => {}
            }
        }
    }

    // Body ended without an explicit [DONE]; treat it as completion.
    warn!("SSE body ended without [DONE] marker");
    let _ = tx.send(StreamEvent::Completed).await;
}

enum SseData {
    /// One content fragment.
    Delta(String),
    /// Explicit end-of-stream marker.
    Done,
    /// Event without text content (role prelude, finish chunk, keepalive).
    Skip,
}

/// Split one complete SSE event off the front of `buffer`.
///
/// Events are delimited by a blank line. Returns `None` while the buffer
/// holds no complete event yet.
fn split_event(buffer: &str) -> Option<(String, String)> {
    let (event, rest) = buffer.split_once("\n\n")?;
    Some((event.to_string(), rest.to_string()))
}

/// Interpret the `data:` payload of one SSE event.
fn parse_event(event_text: &str) -> SseData {
    let mut data = None;
    for line in event_text.lines() {
        if let Some(payload) = line.strip_prefix("data:") {
            data = Some(payload.trim());
        }
    }

    match data {
        Some("[DONE]") => SseData::Done,
        Some(json_str) => match serde_json::from_str::<serde_json::Value>(json_str) {
            Ok(value) => value["choices"][0]["delta"]["content"]
                .as_str()
                .map(|s| SseData::Delta(s.to_string()))
                .unwrap_or(SseData::Skip),
            Err(e) => {
                warn!("Skipping unparseable SSE event: {e}");
                SseData::Skip
            }
        },
        None => SseData::Skip,
    }
}
