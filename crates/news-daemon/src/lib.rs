//! news-clusterer binary library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (serve, process)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    format_console_report, process_file, process_input, read_batch, run_batch, start_server,
};
