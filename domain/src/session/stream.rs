//! Streaming events from the model backend.
//!
//! [`StreamEvent`] is the unit the backend pushes while a response is being
//! generated: zero or more `Delta` fragments, then exactly one terminal
//! event. The sequence is finite and not restartable once consumed.

/// An event in a streaming model response.
///
/// Bridges infrastructure-level streaming (e.g. SSE chunks from an
/// OpenAI-compatible endpoint) to the draft aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental text fragment, in arrival order.
    Delta(String),
    /// End of stream; the response is complete.
    Completed,
    /// The stream failed; no further events follow.
    Error(String),
}

impl StreamEvent {
    /// Returns the fragment text if this is a `Delta`.
    pub fn delta(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}
