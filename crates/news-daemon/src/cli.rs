//! CLI argument parsing for the news-clusterer binary.
//!
//! CLI flags override every other config source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// News Clusterer
///
/// Groups news articles by topic and summarizes each group with an LLM.
#[derive(Parser, Debug)]
#[command(name = "news-clusterer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/news-clusterer/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override bind host
        #[arg(long)]
        host: Option<String>,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Cluster the articles in a JSON file
    Process {
        /// Path to input JSON file containing news articles
        input: PathBuf,

        /// Path to output JSON file (results are printed when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show output JSON file content after processing
        #[arg(short, long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_defaults() {
        let cli = Cli::parse_from(["news-clusterer", "serve"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_serve_overrides() {
        let cli = Cli::parse_from([
            "news-clusterer",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_process() {
        let cli = Cli::parse_from(["news-clusterer", "process", "news.json", "-o", "out.json", "-s"]);
        match cli.command {
            Commands::Process {
                input,
                output,
                show,
            } => {
                assert_eq!(input, PathBuf::from("news.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(show);
            }
            _ => panic!("Expected Process command"),
        }
    }

    #[test]
    fn test_cli_process_requires_input() {
        assert!(Cli::try_parse_from(["news-clusterer", "process"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "news-clusterer",
            "process",
            "news.json",
            "--config",
            "/tmp/config.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/config.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
