//! Chat session domain entities

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Identifier of a committed message.
///
/// Ids are handed out by [`MessageIdGen`] in strictly increasing order, so
/// two messages created in the same instant never collide and sorting by id
/// reproduces creation order within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

/// Monotonic source of [`MessageId`]s.
///
/// Seed it from the loaded session collection at bootstrap so fresh ids
/// never collide with persisted ones.
#[derive(Debug, Default)]
pub struct MessageIdGen {
    next: AtomicU64,
}

impl MessageIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn next_id(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Advance the counter past every id already present in `sessions`.
    pub fn seed_from<'a>(&self, sessions: impl IntoIterator<Item = &'a Session>) {
        let max = sessions
            .into_iter()
            .flat_map(|s| s.messages())
            .map(|m| m.id.0)
            .max();
        if let Some(max) = max {
            self.next.fetch_max(max + 1, Ordering::Relaxed);
        }
    }
}

/// A single chat turn (Entity).
///
/// Immutable once committed to a session: there are no mutators, and the
/// session only ever appends. Equality is by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

/// Globally unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One independent conversation thread (Entity).
///
/// The message list is ordered by send time and only ever grows by strict
/// append; nothing reorders or rewrites committed turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    name: String,
    messages: Vec<Message>,
}

impl Session {
    pub fn new(id: SessionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Commit a message to the end of the history.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_strictly_increasing() {
        let ids = MessageIdGen::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn seed_from_skips_past_persisted_ids() {
        let mut session = Session::new(SessionId::new("s1"), "Chat 1");
        session.append(Message::user(MessageId(7), "hello"));
        session.append(Message::assistant(MessageId(9), "hi"));

        let ids = MessageIdGen::new();
        ids.seed_from([&session]);
        assert_eq!(ids.next_id(), MessageId(10));
    }

    #[test]
    fn seed_from_empty_collection_starts_at_zero() {
        let ids = MessageIdGen::new();
        ids.seed_from([]);
        assert_eq!(ids.next_id(), MessageId(0));
    }

    #[test]
    fn message_equality_is_by_id() {
        let a = Message::user(MessageId(1), "one");
        let b = Message::user(MessageId(1), "different text");
        let c = Message::user(MessageId(2), "one");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn session_appends_in_order() {
        let mut session = Session::new(SessionId::new("s1"), "Chat 1");
        session.append(Message::user(MessageId(0), "first"));
        session.append(Message::assistant(MessageId(1), "second"));

        let contents: Vec<_> = session
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
