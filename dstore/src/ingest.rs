//! Bulk loading of the source dataset
//!
//! The dataset is a JSON array of `{"I": id, "S": speaker, "T": text}`
//! objects. Lines whose id is already present are skipped and counted.

use std::fs;
use std::path::Path;

use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sqlite::SqliteStore;

/// Log progress every this many lines
const PROGRESS_EVERY: usize = 10_000;

/// One line of the source dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    #[serde(rename = "I")]
    pub id: i64,

    #[serde(rename = "S", default)]
    pub speaker: Option<String>,

    #[serde(rename = "T", default)]
    pub text: Option<String>,
}

/// Outcome of an ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    /// Lines dropped because their id already exists
    pub skipped: usize,
}

/// Parse the dataset file and load it into `store`
pub fn ingest_file(store: &SqliteStore, path: impl AsRef<Path>) -> Result<IngestReport> {
    let path = path.as_ref();
    debug!(?path, "ingest_file: reading dataset");
    let content = fs::read_to_string(path)?;
    let lines: Vec<SourceLine> = serde_json::from_str(&content)?;
    info!(?path, lines = lines.len(), "Parsed dataset");
    ingest_lines(store, &lines)
}

/// Insert `lines` in a single transaction
pub fn ingest_lines(store: &SqliteStore, lines: &[SourceLine]) -> Result<IngestReport> {
    let mut conn = store.writer()?;
    let tx = conn.transaction()?;
    let mut report = IngestReport::default();

    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO dialog (idx, speaker, text) VALUES (?1, ?2, ?3)")?;
        for (n, line) in lines.iter().enumerate() {
            let changed = stmt.execute(params![line.id, line.speaker, line.text])?;
            if changed == 0 {
                warn!(id = line.id, "Skipping duplicate id");
                report.skipped += 1;
            } else {
                report.inserted += 1;
            }
            if (n + 1) % PROGRESS_EVERY == 0 {
                debug!(done = n + 1, total = lines.len(), "ingest progress");
            }
        }
    }

    tx.commit()?;
    info!(inserted = report.inserted, skipped = report.skipped, "Ingestion complete");
    Ok(report)
}
