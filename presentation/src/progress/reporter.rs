//! Incremental rendering of the in-flight draft.

use colored::Colorize;
use palaver_application::ChatProgressNotifier;
use palaver_domain::SessionId;
use std::io::Write;
use std::sync::Mutex;

/// Prints the streaming response as it grows.
///
/// The controller republishes the full accumulated draft on every fragment;
/// the printer remembers how much it has already written and emits only the
/// new suffix, so the response appears token by token on one line flow.
#[derive(Default)]
pub struct StreamPrinter {
    printed: Mutex<usize>,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatProgressNotifier for StreamPrinter {
    fn on_stream_start(&self, _session: &SessionId) {
        if let Ok(mut printed) = self.printed.lock() {
            *printed = 0;
        }
        println!("{}", "AI".green().bold());
    }

    fn on_draft_update(&self, _session: &SessionId, content: &str) {
        let Ok(mut printed) = self.printed.lock() else {
            return;
        };
        // Snapshots only ever grow, so the slice from the last position is
        // exactly the fresh text.
        if let Some(suffix) = content.get(*printed..) {
            print!("{suffix}");
            let _ = std::io::stdout().flush();
            *printed = content.len();
        }
    }

    fn on_stream_end(&self, _session: &SessionId) {
        println!();
        println!();
    }
}
