//! Presentation layer for palaver
//!
//! Pure consumers of session state: the console formatter, the incremental
//! stream printer, the interactive REPL, and the clap CLI definition.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::Cli;
pub use output::ConsoleFormatter;
pub use progress::StreamPrinter;
