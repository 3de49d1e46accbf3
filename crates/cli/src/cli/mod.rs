pub mod ask;
pub mod chat;
pub mod config;
pub mod memory;
pub mod sessions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Council: ask several model agents at once and get one synthesized answer.
#[derive(Debug, Parser)]
#[command(name = "council", version, about)]
pub struct Cli {
    /// Write logs to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a single message and print the synthesized answer.
    Ask {
        /// The message to send.
        message: String,
        /// File to attach to the message.
        #[arg(long)]
        attach: Option<PathBuf>,
        /// Continue an existing session instead of starting a new one.
        #[arg(long)]
        session: Option<String>,
        /// Model override (e.g. "gemini-2.5-pro").
        #[arg(long)]
        model: Option<String>,
        /// Ground answers with web search (`--grounding` or `--grounding false`).
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        grounding: Option<bool>,
        /// Print the result as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat.
    Chat {
        /// Session to resume.
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        grounding: Option<bool>,
    },
    /// Manage saved sessions.
    #[command(subcommand)]
    Sessions(SessionsCommand),
    /// Manage remembered facts about you.
    #[command(subcommand)]
    Memory(MemoryCommand),
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions, most recent first.
    List,
    /// Print a session's history.
    Show { id: String },
    /// Delete a session and its stored attachments.
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum MemoryCommand {
    /// List remembered facts.
    List,
    /// Remember a fact.
    Add { fact: String },
    /// Forget one fact (exact text).
    Forget { fact: String },
    /// Forget everything.
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
    /// Store the API key in the OS keychain (`gateway.auth.service`/`account`).
    SetSecret,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `COUNCIL_CONFIG` (or
/// `council.toml` by default). A missing file yields the defaults.
pub fn load_config() -> anyhow::Result<(council_domain::config::Config, String)> {
    let config_path = std::env::var("COUNCIL_CONFIG").unwrap_or_else(|_| "council.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        council_domain::config::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_flag_forms() {
        let cli = Cli::try_parse_from(["council", "ask", "hi", "--grounding"]).unwrap();
        let Command::Ask { grounding, .. } = cli.command else {
            panic!("expected ask")
        };
        assert_eq!(grounding, Some(true));

        let cli = Cli::try_parse_from(["council", "ask", "hi", "--grounding", "false"]).unwrap();
        let Command::Ask { grounding, .. } = cli.command else {
            panic!("expected ask")
        };
        assert_eq!(grounding, Some(false));

        let cli = Cli::try_parse_from(["council", "ask", "hi"]).unwrap();
        let Command::Ask { grounding, .. } = cli.command else {
            panic!("expected ask")
        };
        assert_eq!(grounding, None);
    }

    #[test]
    fn memory_subcommands_parse() {
        let cli = Cli::try_parse_from(["council", "--log-json", "memory", "add", "Likes tea."]).unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::Memory(MemoryCommand::Add { ref fact }) if fact == "Likes tea."));
    }
}
