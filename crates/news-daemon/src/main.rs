//! News Clusterer
//!
//! Groups news articles by topic and summarizes each group with an LLM.
//!
//! # Usage
//!
//! ```bash
//! news-clusterer serve [--host HOST] [--port PORT]
//! news-clusterer process <INPUT> [-o OUTPUT] [-s]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/news-clusterer/config.toml)
//! 3. Config file given with `--config`
//! 4. Environment variables (NEWS_*, `__` between nested keys)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use news_daemon::{process_file, start_server, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            start_server(
                cli.config.as_deref(),
                host.as_deref(),
                port,
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Process {
            input,
            output,
            show,
        } => {
            process_file(
                cli.config.as_deref(),
                &input,
                output.as_deref(),
                show,
                cli.log_level.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
