//! Streaming draft aggregator.
//!
//! Folds the fragments of an in-flight model response into a single growing
//! draft message. At most one draft exists at a time; it lives outside the
//! committed history until [`DraftAggregator::finalize`] turns it into an
//! immutable [`Message`], or [`DraftAggregator::abort`] discards it.
//!
//! The aggregator is a pure state machine: it performs no I/O and knows
//! nothing about channels. The controller feeds it fragments and republishes
//! the snapshots it returns.

use super::entities::{Message, MessageId};
use thiserror::Error;

/// Protocol-misuse errors from the draft state machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    #[error("A response stream is already in progress")]
    AlreadyStreaming,

    #[error("Draft handle is no longer valid")]
    InvalidHandle,
}

/// Ownership token for the single in-flight draft.
///
/// Handles are numbered monotonically, so a handle kept past
/// `finalize`/`abort` can never alias a later draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftHandle(u64);

#[derive(Debug)]
struct Draft {
    handle: DraftHandle,
    content: String,
}

/// Aggregates stream fragments into the single in-flight draft.
#[derive(Debug, Default)]
pub struct DraftAggregator {
    draft: Option<Draft>,
    next_handle: u64,
}

impl DraftAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty draft.
    ///
    /// Fails with [`DraftError::AlreadyStreaming`] while a draft is live;
    /// the system is single-writer and never interleaves two streams.
    pub fn begin(&mut self) -> Result<DraftHandle, DraftError> {
        if self.draft.is_some() {
            return Err(DraftError::AlreadyStreaming);
        }
        let handle = DraftHandle(self.next_handle);
        self.next_handle += 1;
        self.draft = Some(Draft {
            handle,
            content: String::new(),
        });
        Ok(handle)
    }

    /// Append one fragment in arrival order and return the full accumulated
    /// content for republication to observers.
    ///
    /// Appending is the sole mutation path, so every snapshot an observer
    /// sees is a prefix of the final content.
    pub fn append(&mut self, handle: DraftHandle, fragment: &str) -> Result<&str, DraftError> {
        let draft = self.live_draft(handle)?;
        draft.content.push_str(fragment);
        Ok(&draft.content)
    }

    /// Close the draft and convert it into a committed assistant [`Message`]
    /// carrying the supplied fresh id. The handle is dead afterwards.
    pub fn finalize(&mut self, handle: DraftHandle, id: MessageId) -> Result<Message, DraftError> {
        match self.draft.take() {
            Some(draft) if draft.handle == handle => Ok(Message::assistant(id, draft.content)),
            other => {
                self.draft = other;
                Err(DraftError::InvalidHandle)
            }
        }
    }

    /// Discard the draft without committing anything.
    ///
    /// Idempotent: aborting a handle that is no longer live is a no-op, so
    /// duplicate cancellation signals are harmless.
    pub fn abort(&mut self, handle: DraftHandle) {
        if let Some(draft) = &self.draft
            && draft.handle == handle
        {
            self.draft = None;
        }
    }

    /// True while a draft is accumulating fragments.
    pub fn is_streaming(&self) -> bool {
        self.draft.is_some()
    }

    /// Current draft content, if a stream is in flight.
    pub fn content(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.content.as_str())
    }

    fn live_draft(&mut self, handle: DraftHandle) -> Result<&mut Draft, DraftError> {
        match self.draft.as_mut() {
            Some(draft) if draft.handle == handle => Ok(draft),
            _ => Err(DraftError::InvalidHandle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_concatenate_in_arrival_order() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();

        for fragment in ["Hi", " there", "!"] {
            agg.append(handle, fragment).unwrap();
        }

        let message = agg.finalize(handle, MessageId(3)).unwrap();
        assert_eq!(message.content, "Hi there!");
        assert!(!agg.is_streaming());
    }

    #[test]
    fn snapshots_grow_monotonically() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();

        let mut previous = String::new();
        for fragment in ["a", "bc", "", "def"] {
            let snapshot = agg.append(handle, fragment).unwrap().to_string();
            assert!(snapshot.starts_with(&previous));
            previous = snapshot;
        }
        assert_eq!(previous, "abcdef");
    }

    #[test]
    fn second_begin_fails_while_streaming() {
        let mut agg = DraftAggregator::new();
        let _handle = agg.begin().unwrap();
        assert_eq!(agg.begin().unwrap_err(), DraftError::AlreadyStreaming);
    }

    #[test]
    fn begin_is_legal_again_after_finalize() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();
        agg.finalize(handle, MessageId(0)).unwrap();
        assert!(agg.begin().is_ok());
    }

    #[test]
    fn append_after_finalize_is_invalid_handle() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();
        agg.append(handle, "partial").unwrap();
        agg.finalize(handle, MessageId(0)).unwrap();

        assert_eq!(
            agg.append(handle, "late").unwrap_err(),
            DraftError::InvalidHandle
        );
    }

    #[test]
    fn stale_handle_cannot_touch_a_new_draft() {
        let mut agg = DraftAggregator::new();
        let old = agg.begin().unwrap();
        agg.abort(old);

        let fresh = agg.begin().unwrap();
        assert_eq!(agg.append(old, "x").unwrap_err(), DraftError::InvalidHandle);
        assert!(agg.append(fresh, "y").is_ok());
    }

    #[test]
    fn abort_discards_content_and_is_idempotent() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();
        agg.append(handle, "half a rep").unwrap();

        agg.abort(handle);
        assert!(!agg.is_streaming());
        assert_eq!(agg.content(), None);

        // Duplicate cancellation signal
        agg.abort(handle);
        assert!(!agg.is_streaming());
    }

    #[test]
    fn finalize_with_stale_handle_fails() {
        let mut agg = DraftAggregator::new();
        let old = agg.begin().unwrap();
        agg.abort(old);
        assert_eq!(
            agg.finalize(old, MessageId(0)).unwrap_err(),
            DraftError::InvalidHandle
        );
    }

    #[test]
    fn empty_fragment_sequence_finalizes_to_empty_content() {
        let mut agg = DraftAggregator::new();
        let handle = agg.begin().unwrap();
        let message = agg.finalize(handle, MessageId(0)).unwrap();
        assert_eq!(message.content, "");
    }
}
