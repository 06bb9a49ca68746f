//! Query planning: filter composition, context expansion and pagination
//!
//! The planner turns a [`SearchRequest`] into a typed [`Predicate`], runs it
//! against one store session and returns a page plus the unpaginated total.
//! Context requests widen an id to the run of consecutive ids around it.

use std::sync::{Arc, PoisonError, RwLock};

use dialogstore::{DialogRecord, Page, Predicate, RecordStore, StoreSession, TextField};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contiguity::ContiguityIndex;
use crate::error::{Result, SearchError};

/// Default page size when the request names none
pub const DEFAULT_LIMIT: u64 = 200;

/// Upper bound on any page size
pub const MAX_LIMIT: u64 = 1000;

/// A dialog search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Public id to look up
    pub id: Option<i64>,

    /// Speaker substrings, OR-combined
    pub speakers: Vec<String>,

    /// Text substrings, OR-combined
    pub text_terms: Vec<String>,

    /// Widen `id` to its whole run of consecutive ids
    pub context: bool,

    pub offset: u64,

    /// Page size; `None` uses the configured default
    pub limit: Option<u64>,
}

/// A distinct-speaker listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerRequest {
    pub query: Option<String>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// One page of results and the match count before pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// Planner tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    /// Reuse the contiguity index across requests until the corpus changes
    pub cache_index: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            cache_index: true,
        }
    }
}

/// How the id field restricts a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdScope {
    Any,
    Exact(i64),
    Context(i64),
}

impl SearchRequest {
    fn scope(&self) -> Result<IdScope> {
        match (self.id, self.context) {
            (Some(id), true) => Ok(IdScope::Context(id)),
            (Some(id), false) => Ok(IdScope::Exact(id)),
            (None, true) => Err(SearchError::InvalidRequest("context requires an id".to_string())),
            (None, false) => Ok(IdScope::Any),
        }
    }

    /// Speaker and text filters, AND-combined
    fn term_filters(&self) -> Vec<Predicate> {
        vec![
            Predicate::any_contains(TextField::Speaker, non_empty(&self.speakers)),
            Predicate::any_contains(TextField::Text, non_empty(&self.text_terms)),
        ]
    }
}

fn non_empty(terms: &[String]) -> impl Iterator<Item = &str> {
    terms.iter().map(String::as_str).filter(|t| !t.is_empty())
}

struct CachedIndex {
    version: u64,
    index: Arc<ContiguityIndex>,
}

/// Last built index, replaced whole so readers never see a partial build
#[derive(Default)]
struct IndexCache {
    slot: RwLock<Option<CachedIndex>>,
}

impl IndexCache {
    fn get(&self, version: u64) -> Option<Arc<ContiguityIndex>> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cached| cached.version == version)
            .map(|cached| Arc::clone(&cached.index))
    }

    fn put(&self, version: u64, index: Arc<ContiguityIndex>) {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // A slower request must not roll the cache back to an older corpus.
        if guard.as_ref().is_none_or(|cached| cached.version <= version) {
            *guard = Some(CachedIndex { version, index });
        }
    }
}

/// Plans and executes searches against an injected record store
pub struct QueryPlanner<S: RecordStore> {
    store: Arc<S>,
    config: PlannerConfig,
    cache: IndexCache,
}

impl<S: RecordStore> QueryPlanner<S> {
    pub fn new(store: Arc<S>, config: PlannerConfig) -> Self {
        debug!(?config, "QueryPlanner::new");
        Self {
            store,
            config,
            cache: IndexCache::default(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Clamp the requested window to the configured bounds
    pub fn page(&self, offset: u64, limit: Option<u64>) -> Page {
        let limit = limit.unwrap_or(self.config.default_limit).min(self.config.max_limit);
        Page::new(offset, limit)
    }

    /// Run a dialog search
    pub fn search(&self, req: &SearchRequest) -> Result<SearchResult<DialogRecord>> {
        debug!(?req, "search: called");
        let scope = req.scope()?;
        let page = self.page(req.offset, req.limit);

        let session = self.store.session()?;
        let mut parts = req.term_filters();

        match scope {
            IdScope::Any => {}
            IdScope::Exact(id) => parts.push(Predicate::IdEquals(id)),
            IdScope::Context(id) => {
                if session.find_by_id(id)?.is_none() {
                    debug!(id, "search: context target missing");
                    return Err(SearchError::NotFound(id));
                }
                let index = self.context_index(&session)?;
                let run = index.run_containing(id).ok_or(SearchError::NotFound(id))?;
                debug!(id, lo = run.lo(), hi = run.hi(), "search: context run");
                parts.push(Predicate::IdBetween {
                    lo: run.lo(),
                    hi: run.hi(),
                });
            }
        }

        let filter = Predicate::and(parts);
        let total = session.count_by_filter(&filter)?;
        let data = session.select_by_filter(&filter, page)?;
        debug!(total, returned = data.len(), "search: done");

        Ok(SearchResult { data, total })
    }

    /// List distinct speakers
    pub fn speakers(&self, req: &SpeakerRequest) -> Result<SearchResult<String>> {
        debug!(?req, "speakers: called");
        let page = self.page(req.offset, req.limit);
        let query = req.query.as_deref().filter(|q| !q.is_empty());

        let session = self.store.session()?;
        let total = session.count_distinct_speakers(query)?;
        let data = session.select_distinct_speakers(query, page)?;

        Ok(SearchResult { data, total })
    }

    fn context_index(&self, session: &S::Session) -> Result<Arc<ContiguityIndex>> {
        if !self.config.cache_index {
            let ids = session.select_all_ids()?;
            return Ok(Arc::new(ContiguityIndex::try_build(&ids)?));
        }

        let version = session.corpus_version()?;
        if let Some(index) = self.cache.get(version) {
            debug!(version, "context_index: cache hit");
            return Ok(index);
        }

        let (version, ids) = session.id_snapshot()?;
        let index = Arc::new(ContiguityIndex::try_build(&ids)?);
        info!(version, ids = ids.len(), runs = index.len(), "Rebuilt contiguity index");
        self.cache.put(version, Arc::clone(&index));
        Ok(index)
    }
}
