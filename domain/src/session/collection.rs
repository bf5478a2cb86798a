//! Ordered collection of chat sessions.
//!
//! The collection is the unit of persistence: its serialized form is
//! exactly the JSON array of sessions, in creation order. Which session is
//! active is runtime state owned by the controller and never stored here.

use super::entities::{Session, SessionId};
use serde::{Deserialize, Serialize};

/// Insertion-ordered collection of sessions.
///
/// Order equals creation order and doubles as the fallback order when the
/// active session is removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCollection {
    sessions: Vec<Session>,
}

impl SessionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    /// Append a session at the end (creation order).
    pub fn push(&mut self, session: Session) {
        self.sessions.push(session);
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }

    /// First session in creation order, the fallback choice for "active".
    pub fn first(&self) -> Option<&Session> {
        self.sessions.first()
    }

    /// Remove a session by id. Returns it if it was present.
    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id() == id)?;
        Some(self.sessions.remove(index))
    }
}
