//! Chat controller use case.
//!
//! The controller is the state machine over the session collection: it
//! creates, selects, and deletes sessions, and drives the send-message
//! protocol — commit the user turn, invoke the backend, fold the fragment
//! stream into the draft, commit the finished assistant turn. Every
//! mutation is mirrored to the session store before the operation returns.
//!
//! All methods take `&mut self`, so operations are serialized: a select or
//! delete can never interleave with an in-flight `send`. A stream always
//! commits to the session that was active when `send` started.

use crate::ports::chat_backend::{BackendError, ChatBackend};
use crate::ports::chat_progress::ChatProgressNotifier;
use crate::ports::session_store::{SessionStore, StoreError};
use palaver_domain::{
    DraftAggregator, DraftError, Message, MessageId, MessageIdGen, Session, SessionCollection,
    SessionId, StreamEvent,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors surfaced by controller operations.
///
/// Input-validation and protocol-misuse variants (`EmptyInput`,
/// `StreamInProgress`, `Draft`) are caller bugs and fail fast with no state
/// change. Runtime variants (`StreamFailed`, `Store`) are surfaced for user
/// notification; the controller is back in the idle state afterwards.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("No active session")]
    NoActiveSession,

    #[error("A response is already streaming")]
    StreamInProgress,

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Response stream failed: {0}")]
    StreamFailed(String),

    #[error("Response stream cancelled")]
    Cancelled,

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// State machine over the session collection.
///
/// Owns the collection, the active-session pointer, and the draft
/// aggregator; talks to the outside world only through injected ports.
pub struct ChatController {
    sessions: SessionCollection,
    active: Option<SessionId>,
    aggregator: DraftAggregator,
    ids: MessageIdGen,
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn ChatProgressNotifier>,
}

impl ChatController {
    /// Load persisted sessions and bring the controller to "active session
    /// idle".
    ///
    /// An empty (or unreadable) store bootstraps one default session so the
    /// collection is never empty while the application runs. A failed
    /// initial save is logged and tolerated — the in-memory session is
    /// still usable and the next successful save will persist it.
    pub async fn bootstrap(
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn ChatProgressNotifier>,
    ) -> Self {
        let sessions = store.load().await;
        let ids = MessageIdGen::new();
        ids.seed_from(sessions.iter());

        let mut controller = Self {
            sessions,
            active: None,
            aggregator: DraftAggregator::new(),
            ids,
            backend,
            store,
            notifier,
        };

        if controller.sessions.is_empty() {
            let id = controller.spawn_session();
            info!("No persisted sessions, created default session {id}");
            if let Err(e) = controller.persist().await {
                warn!("Could not persist bootstrap session: {e}");
            }
        } else {
            controller.active = controller.sessions.first().map(|s| s.id().clone());
            info!("Restored {} session(s)", controller.sessions.len());
        }

        controller
    }

    /// Sessions in creation order, for display.
    pub fn sessions(&self) -> &SessionCollection {
        &self.sessions
    }

    pub fn active_session_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    /// True while a response stream is in flight.
    pub fn is_streaming(&self) -> bool {
        self.aggregator.is_streaming()
    }

    /// Content of the in-flight draft, if any.
    pub fn draft_content(&self) -> Option<&str> {
        self.aggregator.content()
    }

    /// Identifier of the model the backend is configured to use.
    pub fn model_name(&self) -> &str {
        self.backend.model()
    }

    /// Create a new empty session, select it, and persist.
    pub async fn create_session(&mut self) -> Result<SessionId, ControllerError> {
        let id = self.spawn_session();
        debug!("Created session {id}");
        self.persist().await?;
        Ok(id)
    }

    /// Switch the active session pointer.
    pub fn select_session(&mut self, id: &SessionId) -> Result<(), ControllerError> {
        if !self.sessions.contains(id) {
            return Err(ControllerError::UnknownSession(id.clone()));
        }
        self.active = Some(id.clone());
        Ok(())
    }

    /// Remove a session and persist.
    ///
    /// If the removed session was active, the first remaining session (in
    /// creation order) becomes active; if none remain, a fresh default
    /// session is created so the collection is never empty.
    pub async fn delete_session(&mut self, id: &SessionId) -> Result<(), ControllerError> {
        if self.sessions.remove(id).is_none() {
            return Err(ControllerError::UnknownSession(id.clone()));
        }
        debug!("Deleted session {id}");

        if self.active.as_ref() == Some(id) {
            self.active = self.sessions.first().map(|s| s.id().clone());
            if self.active.is_none() {
                let fresh = self.spawn_session();
                info!("Deleted last session, created default session {fresh}");
            }
        }

        self.persist().await?;
        Ok(())
    }

    /// Send a user message on the active session and stream the response.
    ///
    /// Commits the user turn immediately (it is never rolled back), then
    /// drives the fragment stream through the draft aggregator until the
    /// backend signals completion, and commits the assistant turn. Returns
    /// the id of the committed assistant message.
    ///
    /// `cancel` stops the stream between fragments: the draft is discarded
    /// and the operation returns [`ControllerError::Cancelled`].
    pub async fn send(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<MessageId, ControllerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyInput);
        }
        let session_id = self.active.clone().ok_or(ControllerError::NoActiveSession)?;
        if self.aggregator.is_streaming() {
            return Err(ControllerError::StreamInProgress);
        }

        // Commit the user turn before anything can fail mid-stream.
        let user_message = Message::user(self.ids.next_id(), text);
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| ControllerError::UnknownSession(session_id.clone()))?;
        session.append(user_message);
        self.persist().await?;

        let history = session_history(&self.sessions, &session_id);
        let mut stream = self
            .backend
            .stream_chat(&history)
            .await
            .map_err(backend_failure)?;

        let handle = self.aggregator.begin()?;
        self.notifier.on_stream_start(&session_id);
        debug!("Streaming response for session {session_id}");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.aggregator.abort(handle);
                    self.notifier.on_stream_end(&session_id);
                    info!("Stream cancelled for session {session_id}");
                    return Err(ControllerError::Cancelled);
                }
                event = stream.next_event() => match event {
                    Some(StreamEvent::Delta(fragment)) => {
                        let snapshot = self.aggregator.append(handle, &fragment)?;
                        self.notifier.on_draft_update(&session_id, snapshot);
                    }
                    Some(StreamEvent::Completed) => break,
                    Some(StreamEvent::Error(reason)) => {
                        self.aggregator.abort(handle);
                        self.notifier.on_stream_end(&session_id);
                        warn!("Stream failed for session {session_id}: {reason}");
                        return Err(ControllerError::StreamFailed(reason));
                    }
                    None => {
                        self.aggregator.abort(handle);
                        self.notifier.on_stream_end(&session_id);
                        warn!("Stream for session {session_id} ended without completion");
                        return Err(ControllerError::StreamFailed(
                            "stream ended unexpectedly".to_string(),
                        ));
                    }
                }
            }
        }

        let assistant_id = self.ids.next_id();
        let message = self.aggregator.finalize(handle, assistant_id)?;
        self.notifier.on_stream_end(&session_id);

        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| ControllerError::UnknownSession(session_id.clone()))?;
        session.append(message);
        self.persist().await?;

        info!("Committed assistant message {assistant_id:?} to session {session_id}");
        Ok(assistant_id)
    }

    /// Create a session in memory and select it. Does not persist.
    fn spawn_session(&mut self) -> SessionId {
        let id = SessionId::new(uuid::Uuid::new_v4().to_string());
        let name = format!("Chat {}", self.sessions.len() + 1);
        self.sessions.push(Session::new(id.clone(), name));
        self.active = Some(id.clone());
        id
    }

    async fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.sessions).await
    }
}

fn session_history(sessions: &SessionCollection, id: &SessionId) -> Vec<Message> {
    sessions
        .get(id)
        .map(|s| s.messages().to_vec())
        .unwrap_or_default()
}

fn backend_failure(e: BackendError) -> ControllerError {
    ControllerError::StreamFailed(e.to_string())
}
