//! Roster Lookup
//!
//! Name search over a membership roster.
//!
//! # Usage
//!
//! ```bash
//! roster-lookup search <NAME>... [--download DIR]
//! roster-lookup suggest <QUERY> [--json]
//! roster-lookup interactive
//! roster-lookup config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/roster-lookup/config.toml)
//! 3. Environment variables (LOOKUP_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use lookup_cli::{
    handle_interactive, handle_search, handle_suggest, init_logging, load_settings, show_config,
    Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(
        cli.config.as_deref(),
        cli.log_level.as_deref(),
        cli.roster.as_deref(),
    )?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Search { name, download } => {
            handle_search(&settings, &name, download.as_deref()).await?;
        }
        Commands::Suggest { query, json } => {
            handle_suggest(&settings, &query, json).await?;
        }
        Commands::Interactive => {
            handle_interactive(&settings).await?;
        }
        Commands::Config => {
            show_config(&settings)?;
        }
    }

    Ok(())
}
