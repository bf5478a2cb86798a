//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Multi-session streaming LLM chat client.
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about)]
pub struct Cli {
    /// Path to a config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model identifier override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory for the session snapshot
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Ignore config files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "palaver",
            "--model",
            "gpt-4.1",
            "--data-dir",
            "/tmp/p",
            "-vv",
        ]);
        assert_eq!(cli.model.as_deref(), Some("gpt-4.1"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.no_config);
    }
}
