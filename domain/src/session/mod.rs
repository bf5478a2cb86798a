//! Chat session domain.
//!
//! - [`entities::Session`] — one conversation thread with its message history
//! - [`entities::Message`] — a single committed chat turn
//! - [`collection::SessionCollection`] — insertion-ordered sessions, the unit of persistence
//! - [`draft::DraftAggregator`] — folds stream fragments into the in-flight draft
//! - [`stream::StreamEvent`] — fragments and terminal signals from the backend

pub mod collection;
pub mod draft;
pub mod entities;
pub mod stream;
