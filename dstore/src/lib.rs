//! DialogStore - read-only record store for ordered dialog corpora
//!
//! Holds dialog lines (speaker, text, position) in a single SQLite table and
//! answers the small set of queries a search front-end needs: filtered
//! selects, counts, the ordered id list and distinct speakers.
//!
//! # Layout
//!
//! ```text
//! dialog
//! ├── "index"  INTEGER PRIMARY KEY AUTOINCREMENT   -- internal sequence key
//! ├── idx      INTEGER NOT NULL UNIQUE             -- public id, may have gaps
//! ├── speaker  TEXT
//! └── text     TEXT
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dialogstore::{Page, Predicate, RecordStore, SqliteStore, StoreSession, TextField};
//!
//! let store = SqliteStore::open("data.db")?;
//! let session = store.session()?;
//! let filter = Predicate::any_contains(TextField::Speaker, ["March 7th"]);
//! let rows = session.select_by_filter(&filter, Page::new(0, 20))?;
//! ```

mod error;
mod filter;
pub mod ingest;
mod record;
mod sqlite;
mod store;

pub use error::{Result, StoreError};
pub use filter::{Predicate, TextField};
pub use ingest::{IngestReport, SourceLine};
pub use record::DialogRecord;
pub use sqlite::{SqliteSession, SqliteStore};
pub use store::{Page, RecordStore, StoreSession};
