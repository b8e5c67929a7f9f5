//! CLI argument parsing for roster-lookup.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Roster Lookup
///
/// Look members up by name and show their membership document.
#[derive(Parser, Debug)]
#[command(name = "roster-lookup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/roster-lookup/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// JSON roster file; selects the in-memory backend
    #[arg(long, global = true)]
    pub roster: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Lookup commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a full name ("first last" or "last first") to a member
    Search {
        /// Name to look up
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Download the member's document into this directory
        #[arg(short, long)]
        download: Option<PathBuf>,
    },

    /// Print name suggestions for a partial query
    Suggest {
        /// Partial first or last name
        query: String,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Line-driven search session with live suggestions
    Interactive,

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_joins_words() {
        let cli = Cli::parse_from(["roster-lookup", "search", "Fatima", "Zahra"]);
        match cli.command {
            Commands::Search { name, download } => {
                assert_eq!(name, vec!["Fatima", "Zahra"]);
                assert!(download.is_none());
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_requires_name() {
        assert!(Cli::try_parse_from(["roster-lookup", "search"]).is_err());
    }

    #[test]
    fn test_cli_search_with_download() {
        let cli = Cli::parse_from(["roster-lookup", "search", "-d", "/tmp/docs", "Ahmed"]);
        match cli.command {
            Commands::Search { download, .. } => {
                assert_eq!(download, Some(PathBuf::from("/tmp/docs")));
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_suggest_json() {
        let cli = Cli::parse_from(["roster-lookup", "suggest", "ahm", "--json"]);
        match cli.command {
            Commands::Suggest { query, json } => {
                assert_eq!(query, "ahm");
                assert!(json);
            }
            _ => panic!("Expected Suggest command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "roster-lookup",
            "interactive",
            "--config",
            "/etc/lookup.toml",
            "--log-level",
            "debug",
            "--roster",
            "members.json",
        ]);
        assert!(matches!(cli.command, Commands::Interactive));
        assert_eq!(cli.config, Some("/etc/lookup.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert_eq!(cli.roster, Some("members.json".to_string()));
    }

    #[test]
    fn test_cli_config() {
        let cli = Cli::parse_from(["roster-lookup", "config"]);
        assert!(matches!(cli.command, Commands::Config));
    }
}
