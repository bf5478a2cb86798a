//! Chat streaming progress port.
//!
//! [`ChatProgressNotifier`] is an output port the presentation layer
//! implements to render the in-flight draft as it grows. The controller
//! republishes the full accumulated draft content after every fragment, so
//! each callback argument is a monotonically-growing prefix of the final
//! response.

use palaver_domain::SessionId;

/// Progress notifier for an in-flight response stream.
///
/// All methods have default no-op implementations, so implementers only
/// need to override the callbacks they care about.
pub trait ChatProgressNotifier: Send + Sync {
    /// A response stream opened for `session`.
    fn on_stream_start(&self, _session: &SessionId) {}

    /// The draft grew; `content` is the full accumulated text so far.
    fn on_draft_update(&self, _session: &SessionId, _content: &str) {}

    /// The stream ended — committed, failed, or cancelled. The draft is
    /// gone either way.
    fn on_stream_end(&self, _session: &SessionId) {}
}

/// No-op implementation for tests and headless runs.
pub struct NoChatProgress;

impl ChatProgressNotifier for NoChatProgress {}
