//! DialogSearch - CLI entry point
//!
//! Serves the HTTP API, loads datasets and runs one-off searches.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use dialogsearch::api::{self, AppState};
use dialogsearch::api::types::split_terms;
use dialogsearch::cli::{Cli, Command};
use dialogsearch::config::Config;
use dialogsearch::{QueryPlanner, SearchRequest, SpeakerRequest};
use dialogstore::{DialogRecord, SqliteStore, ingest};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(path) = cli.database.clone() {
        config.database.path = path;
    }
    config.validate().context("Invalid configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => cmd_serve(&config, bind).await,
        Command::Ingest { path } => cmd_ingest(&config, &path),
        Command::Search {
            idx,
            speakers,
            text,
            context,
            offset,
            limit,
            json,
        } => {
            let req = SearchRequest {
                id: idx,
                speakers: speakers.as_deref().map(split_terms).unwrap_or_default(),
                text_terms: text.as_deref().map(split_terms).unwrap_or_default(),
                context,
                offset,
                limit,
            };
            cmd_search(&config, &req, json)
        }
        Command::Speakers {
            query,
            offset,
            limit,
            json,
        } => cmd_speakers(&config, &SpeakerRequest { query, offset, limit }, json),
    }
}

fn open_planner(config: &Config) -> Result<QueryPlanner<SqliteStore>> {
    let store = SqliteStore::open_existing(&config.database.path)
        .context(format!("Failed to open database {}", config.database.path.display()))?;
    Ok(QueryPlanner::new(Arc::new(store), config.search.planner_config()))
}

async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let store = SqliteStore::open(&config.database.path)
        .context(format!("Failed to open database {}", config.database.path.display()))?;
    store.log_summary().context("Failed to read database")?;

    let planner = QueryPlanner::new(Arc::new(store), config.search.planner_config());
    let app = api::create_router(AppState::new(planner), config.server.cors);

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    info!(%addr, "dialogsearch starting");
    api::serve(app, &addr).await
}

fn cmd_ingest(config: &Config, path: &Path) -> Result<()> {
    let store = SqliteStore::open(&config.database.path)
        .context(format!("Failed to open database {}", config.database.path.display()))?;
    let report = ingest::ingest_file(&store, path).context(format!("Failed to ingest {}", path.display()))?;

    println!(
        "{} Ingested {} lines into {}",
        "✓".green(),
        report.inserted.to_string().cyan(),
        config.database.path.display()
    );
    if report.skipped > 0 {
        println!("  {} duplicate ids skipped", report.skipped.to_string().yellow());
    }
    Ok(())
}

fn cmd_search(config: &Config, req: &SearchRequest, json: bool) -> Result<()> {
    let planner = open_planner(config)?;
    let result = planner.search(req)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.data.is_empty() {
        println!("No dialog found");
    }
    for record in &result.data {
        print_record(record);
    }
    println!(
        "{}",
        format!("{} of {} shown", result.data.len(), result.total).dimmed()
    );
    Ok(())
}

fn cmd_speakers(config: &Config, req: &SpeakerRequest, json: bool) -> Result<()> {
    let planner = open_planner(config)?;
    let result = planner.speakers(req)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for speaker in &result.data {
        println!("{}", speaker);
    }
    println!(
        "{}",
        format!("{} of {} shown", result.data.len(), result.total).dimmed()
    );
    Ok(())
}

fn print_record(record: &DialogRecord) {
    let speaker = record.speaker.as_deref().unwrap_or("-");
    let text = record.text.as_deref().unwrap_or("");
    println!("{} {}: {}", record.id.to_string().yellow(), speaker.cyan(), text);
}
