//! Application layer for palaver
//!
//! This crate contains the chat controller use case and the port
//! definitions its adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_backend::{BackendError, ChatBackend, StreamHandle},
    chat_progress::{ChatProgressNotifier, NoChatProgress},
    session_store::{SessionStore, StoreError},
};
pub use use_cases::chat_controller::{ChatController, ControllerError};
