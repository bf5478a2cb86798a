//! Chat backend adapters

pub mod open_chat;

pub use open_chat::OpenAiChatBackend;
