//! CLI argument parsing for dialogsearch

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DialogSearch - search a dialog corpus by speaker, text or scene
#[derive(Parser, Debug)]
#[command(name = "ds")]
#[command(author, version, about = "Speaker, text and context search over a dialog corpus", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Load a JSON dataset of {"I", "S", "T"} lines into the database
    Ingest {
        /// Dataset file
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Search dialog lines
    Search {
        /// Public id of a line
        #[arg(short, long)]
        idx: Option<i64>,

        /// Speaker substrings joined by `//`
        #[arg(short, long)]
        speakers: Option<String>,

        /// Text substrings joined by `//`
        #[arg(short, long)]
        text: Option<String>,

        /// Return the whole scene around --idx
        #[arg(short = 'x', long)]
        context: bool,

        #[arg(short, long, default_value = "0")]
        offset: u64,

        #[arg(short = 'n', long)]
        limit: Option<u64>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// List distinct speakers
    Speakers {
        /// Substring the speaker must contain
        query: Option<String>,

        #[arg(short, long, default_value = "0")]
        offset: u64,

        #[arg(short = 'n', long)]
        limit: Option<u64>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["ds", "--database", "x.db", "search", "-i", "12", "--context", "-n", "5"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
        match cli.command {
            Command::Search {
                idx, context, limit, ..
            } => {
                assert_eq!(idx, Some(12));
                assert!(context);
                assert_eq!(limit, Some(5));
            }
            other => panic!("Expected Search, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_speakers_positional_query() {
        let cli = Cli::try_parse_from(["ds", "speakers", "Ana"]).unwrap();
        match cli.command {
            Command::Speakers { query, offset, .. } => {
                assert_eq!(query.as_deref(), Some("Ana"));
                assert_eq!(offset, 0);
            }
            other => panic!("Expected Speakers, got {:?}", other),
        }
    }
}
