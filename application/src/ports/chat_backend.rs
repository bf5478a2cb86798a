//! Chat backend port
//!
//! Defines the interface for the model provider: it takes the ordered
//! message history of a session and returns a lazy, cancellable sequence of
//! text fragments. Implementations (adapters) live in the infrastructure
//! layer.

use async_trait::async_trait;
use palaver_domain::{Message, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur when invoking the model backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

/// Gateway to the model provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start a streamed completion for `history` — the full prior message
    /// list of the session plus the new user message, in send order.
    async fn stream_chat(&self, history: &[Message]) -> Result<StreamHandle, BackendError>;

    /// Identifier of the model this backend is configured to use.
    fn model(&self) -> &str;
}

/// Handle for receiving the fragments of one in-flight response.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The sequence is finite and not
/// restartable once consumed; dropping the handle tears down the producer.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event in arrival order.
    ///
    /// `None` means the producer went away without a terminal event, which
    /// the controller treats as a stream failure.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}
