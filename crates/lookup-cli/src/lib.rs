//! roster-lookup command-line library.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (search, suggest, interactive, config)
//! - `presenter`: Rendering of results and document downloads
//! - `interactive`: Line-driven widget session

pub mod cli;
pub mod commands;
pub mod interactive;
pub mod presenter;

pub use cli::{Cli, Commands};
pub use commands::{
    handle_interactive, handle_search, handle_suggest, init_logging, load_settings, show_config,
};
pub use interactive::{parse_line, run_interactive, Command};
pub use presenter::{document_file_name, render_list, Presentation, ResultPresenter};
