//! SQLite implementation of the record store

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::filter::Predicate;
use crate::record::DialogRecord;
use crate::store::{Page, RecordStore, StoreSession};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dialog (
    "index" INTEGER PRIMARY KEY AUTOINCREMENT,
    idx INTEGER NOT NULL UNIQUE,
    speaker TEXT,
    text TEXT
);
CREATE INDEX IF NOT EXISTS dialog_speaker ON dialog(speaker);
"#;

const RECORD_COLUMNS: &str = r#""index", idx, speaker, text"#;

/// Busy timeout for read sessions while an ingest holds the write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on a SQLite dialog database
///
/// Holds only the path; connections are opened per session.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open the database at `path`, creating the file and schema if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(?path, "SqliteStore::open: schema ready");

        Ok(Self { path })
    }

    /// Open an existing database without creating anything
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(StoreError::MissingDatabase { path });
        }
        debug!(?path, "SqliteStore::open_existing");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log record and speaker counts, used at service startup
    pub fn log_summary(&self) -> Result<()> {
        let session = self.session()?;
        let records = session.count_by_filter(&Predicate::All)?;
        let speakers = session.count_distinct_speakers(None)?;
        info!(path = ?self.path, records, speakers, "dialog store ready");
        Ok(())
    }

    /// Writable connection, used only by ingestion
    pub(crate) fn writer(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}

impl RecordStore for SqliteStore {
    type Session = SqliteSession;

    fn session(&self) -> Result<SqliteSession> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!(path = ?self.path, "session: opened read-only connection");
        Ok(SqliteSession { conn })
    }
}

/// A read-only connection scoped to one request
///
/// The connection closes when the session is dropped.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    fn count(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let n: i64 = self.conn.query_row(sql, params_from_iter(params.iter()), |r| r.get(0))?;
        to_u64("count", n)
    }
}

impl StoreSession for SqliteSession {
    fn select_by_filter(&self, filter: &Predicate, page: Page) -> Result<Vec<DialogRecord>> {
        filter.validate()?;
        let mut params = Vec::new();
        let clause = filter.to_sql(&mut params);
        params.push(Value::Integer(to_i64(page.limit)));
        params.push(Value::Integer(to_i64(page.offset)));

        let sql = format!(
            "SELECT {} FROM dialog WHERE {} ORDER BY idx ASC LIMIT ? OFFSET ?",
            RECORD_COLUMNS, clause
        );
        debug!(%sql, ?page, "select_by_filter");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count_by_filter(&self, filter: &Predicate) -> Result<u64> {
        filter.validate()?;
        let mut params = Vec::new();
        let clause = filter.to_sql(&mut params);
        let sql = format!("SELECT COUNT(*) FROM dialog WHERE {}", clause);
        debug!(%sql, "count_by_filter");
        self.count(&sql, &params)
    }

    fn select_all_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT idx FROM dialog ORDER BY idx ASC")?;
        let ids = stmt
            .query_map([], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = ids.len(), "select_all_ids");
        Ok(ids)
    }

    fn select_distinct_speakers(&self, query: Option<&str>, page: Page) -> Result<Vec<String>> {
        let (clause, mut params) = speaker_clause(query);
        params.push(Value::Integer(to_i64(page.limit)));
        params.push(Value::Integer(to_i64(page.offset)));

        let sql = format!(
            "SELECT DISTINCT speaker FROM dialog WHERE {} ORDER BY speaker ASC LIMIT ? OFFSET ?",
            clause
        );
        debug!(?query, ?page, "select_distinct_speakers");

        let mut stmt = self.conn.prepare(&sql)?;
        let speakers = stmt
            .query_map(params_from_iter(params.iter()), |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(speakers)
    }

    fn count_distinct_speakers(&self, query: Option<&str>) -> Result<u64> {
        let (clause, params) = speaker_clause(query);
        let sql = format!("SELECT COUNT(DISTINCT speaker) FROM dialog WHERE {}", clause);
        self.count(&sql, &params)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<DialogRecord>> {
        let sql = format!("SELECT {} FROM dialog WHERE idx = ?1", RECORD_COLUMNS);
        let record = self.conn.query_row(&sql, params![id], record_from_row).optional()?;
        debug!(id, found = record.is_some(), "find_by_id");
        Ok(record)
    }

    fn corpus_version(&self) -> Result<u64> {
        // Append-only corpus: the autoincrement key only grows when rows land.
        let v: i64 = self
            .conn
            .query_row(r#"SELECT COALESCE(MAX("index"), 0) FROM dialog"#, [], |r| r.get(0))?;
        to_u64("corpus version", v)
    }

    fn id_snapshot(&self) -> Result<(u64, Vec<i64>)> {
        let tx = self.conn.unchecked_transaction()?;
        let version = self.corpus_version()?;
        let ids = self.select_all_ids()?;
        tx.finish()?;
        Ok((version, ids))
    }
}

/// Non-null speakers, optionally containing `query`
fn speaker_clause(query: Option<&str>) -> (String, Vec<Value>) {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => (
            "speaker IS NOT NULL AND instr(speaker, ?) > 0".to_string(),
            vec![Value::Text(q.to_string())],
        ),
        None => ("speaker IS NOT NULL".to_string(), Vec::new()),
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DialogRecord> {
    Ok(DialogRecord {
        sequence_key: row.get(0)?,
        id: row.get(1)?,
        speaker: row.get(2)?,
        text: row.get(3)?,
    })
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn to_u64(what: &'static str, v: i64) -> Result<u64> {
    u64::try_from(v).map_err(|_| StoreError::OutOfRange { what, value: v })
}
