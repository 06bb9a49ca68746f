//! Record store contract

use crate::error::Result;
use crate::filter::Predicate;
use crate::record::DialogRecord;

/// Pagination window applied by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// A window large enough to return every row
    pub fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: i64::MAX as u64,
        }
    }
}

/// A source of per-request store sessions
///
/// Implementations must be safe to share between request handlers; each
/// handler acquires its own session and drops it when the request ends.
pub trait RecordStore: Send + Sync + 'static {
    type Session: StoreSession;

    /// Acquire a session for the duration of one request
    fn session(&self) -> Result<Self::Session>;
}

/// Read operations available within one session
///
/// All record-returning operations order by public id ascending.
pub trait StoreSession {
    fn select_by_filter(&self, filter: &Predicate, page: Page) -> Result<Vec<DialogRecord>>;

    fn count_by_filter(&self, filter: &Predicate) -> Result<u64>;

    fn select_all_ids(&self) -> Result<Vec<i64>>;

    /// Distinct non-null speakers containing `query`, ascending
    fn select_distinct_speakers(&self, query: Option<&str>, page: Page) -> Result<Vec<String>>;

    fn count_distinct_speakers(&self, query: Option<&str>) -> Result<u64>;

    fn find_by_id(&self, id: i64) -> Result<Option<DialogRecord>>;

    /// Token that changes whenever records are added to the corpus
    fn corpus_version(&self) -> Result<u64>;

    /// Corpus version and the full ascending id list, read consistently
    fn id_snapshot(&self) -> Result<(u64, Vec<i64>)>;
}
