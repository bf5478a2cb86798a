//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use colored::Colorize;
use palaver_application::{ChatController, ControllerError};
use palaver_domain::SessionId;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tokio_util::sync::CancellationToken;

/// Interactive chat REPL.
///
/// Plain input sends a message on the active session; `/` commands manage
/// sessions. Ctrl-C during a response cancels the stream; at the prompt it
/// does nothing.
pub struct ChatRepl {
    controller: ChatController,
}

impl ChatRepl {
    pub fn new(controller: ChatController) -> Self {
        Self { controller }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("palaver").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(&mut rl, line).await {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Send one message and render the streamed response. Ctrl-C cancels.
    async fn process_message(&mut self, text: &str) {
        let cancel = CancellationToken::new();
        let send = self.controller.send(text, &cancel);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                result = &mut send => break result,
                _ = tokio::signal::ctrl_c() => {
                    cancel.cancel();
                }
            }
        };

        match result {
            Ok(_) => {}
            Err(ControllerError::Cancelled) => println!("{}", "(cancelled)".dimmed()),
            Err(e) => eprintln!("{} {e}", "error:".red().bold()),
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                 Palaver Chat                │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.controller.model_name());
        println!();
        self.print_sessions();
        println!();
        println!("Type a message to chat, or /help for commands.");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?      - Show this help");
        println!("  /new               - Start a new chat");
        println!("  /chats             - List chats");
        println!("  /switch <number>   - Switch to a chat");
        println!("  /delete [number]   - Delete a chat (asks first)");
        println!("  /model             - Show the active model");
        println!("  /quit, /exit, /q   - Exit");
        println!();
    }

    fn print_sessions(&self) {
        print!(
            "{}",
            ConsoleFormatter::format_session_list(
                self.controller.sessions(),
                self.controller.active_session_id(),
            )
        );
    }

    fn print_active_transcript(&self) {
        if let Some(session) = self.controller.active_session() {
            println!();
            println!("── {} ──", session.name());
            print!("{}", ConsoleFormatter::format_transcript(session));
        }
    }

    /// Handle slash commands. Returns true if the REPL should exit.
    async fn handle_command(&mut self, rl: &mut DefaultEditor, cmd: &str) -> bool {
        let mut parts = cmd.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();

        match name {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => self.print_help(),
            "/model" => println!("Model: {}", self.controller.model_name()),
            "/new" => match self.controller.create_session().await {
                Ok(_) => self.print_sessions(),
                Err(e) => eprintln!("{} {e}", "error:".red().bold()),
            },
            "/chats" => self.print_sessions(),
            "/switch" => match self.session_at(arg) {
                Some(id) => match self.controller.select_session(&id) {
                    Ok(()) => self.print_active_transcript(),
                    Err(e) => eprintln!("{} {e}", "error:".red().bold()),
                },
                None => println!("Usage: /switch <number> (see /chats)"),
            },
            "/delete" => {
                let target = match arg {
                    Some(_) => self.session_at(arg),
                    None => self.controller.active_session_id().cloned(),
                };
                match target {
                    Some(id) => self.confirm_and_delete(rl, &id).await,
                    None => println!("Usage: /delete [number] (see /chats)"),
                }
            }
            _ => println!("Unknown command: {name} (try /help)"),
        }
        false
    }

    /// Resolve a 1-based session number from `/chats`.
    fn session_at(&self, arg: Option<&str>) -> Option<SessionId> {
        let index: usize = arg?.parse().ok()?;
        self.controller
            .sessions()
            .sessions()
            .get(index.checked_sub(1)?)
            .map(|s| s.id().clone())
    }

    async fn confirm_and_delete(&mut self, rl: &mut DefaultEditor, id: &SessionId) {
        let Some(name) = self.controller.sessions().get(id).map(|s| s.name().to_string()) else {
            println!("No such chat.");
            return;
        };

        let answer = rl.readline(&format!("Delete '{name}'? This cannot be undone. [y/N] "));
        match answer {
            Ok(line) if line.trim().eq_ignore_ascii_case("y") => {
                match self.controller.delete_session(id).await {
                    Ok(()) => self.print_sessions(),
                    Err(e) => eprintln!("{} {e}", "error:".red().bold()),
                }
            }
            _ => println!("Not deleted."),
        }
    }
}
