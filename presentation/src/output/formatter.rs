//! Console rendering of sessions and transcripts.

use colored::Colorize;
use palaver_domain::{Message, Role, Session, SessionCollection, SessionId};

/// Formats session state for the terminal.
///
/// Pure string building; printing is left to the caller.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Numbered session list with a marker on the active session.
    pub fn format_session_list(
        collection: &SessionCollection,
        active: Option<&SessionId>,
    ) -> String {
        let mut out = String::new();
        for (index, session) in collection.iter().enumerate() {
            let marker = if Some(session.id()) == active {
                "*"
            } else {
                " "
            };
            let count = session.messages().len();
            out.push_str(&format!(
                "{} {:>2}. {} ({} message{})\n",
                marker,
                index + 1,
                session.name().bold(),
                count,
                if count == 1 { "" } else { "s" }
            ));
        }
        out
    }

    /// Full transcript of one session.
    pub fn format_transcript(session: &Session) -> String {
        let mut out = String::new();
        for message in session.messages() {
            out.push_str(&Self::format_message(message));
            out.push('\n');
        }
        out
    }

    pub fn format_message(message: &Message) -> String {
        let header = match message.role {
            Role::User => "You".blue().bold(),
            Role::Assistant => "AI".green().bold(),
        };
        format!("{header}\n{}\n", message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_domain::MessageId;

    fn sample_collection() -> SessionCollection {
        let mut collection = SessionCollection::new();
        let mut session = Session::new(SessionId::new("a"), "Chat 1");
        session.append(Message::user(MessageId(0), "Hello"));
        session.append(Message::assistant(MessageId(1), "Hi there!"));
        collection.push(session);
        collection.push(Session::new(SessionId::new("b"), "Chat 2"));
        collection
    }

    #[test]
    fn session_list_numbers_in_creation_order_and_marks_active() {
        colored::control::set_override(false);
        let collection = sample_collection();
        let active = SessionId::new("b");

        let list = ConsoleFormatter::format_session_list(&collection, Some(&active));
        let lines: Vec<&str> = list.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1. Chat 1 (2 messages)"));
        assert!(lines[0].starts_with(' '));
        assert!(lines[1].contains("2. Chat 2 (0 messages)"));
        assert!(lines[1].starts_with('*'));
    }

    #[test]
    fn transcript_renders_each_turn() {
        colored::control::set_override(false);
        let collection = sample_collection();
        let transcript = ConsoleFormatter::format_transcript(collection.first().unwrap());

        assert!(transcript.contains("You\nHello"));
        assert!(transcript.contains("AI\nHi there!"));
        // User turn precedes the assistant turn.
        assert!(transcript.find("Hello").unwrap() < transcript.find("Hi there!").unwrap());
    }
}
