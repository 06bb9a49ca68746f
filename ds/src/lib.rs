//! DialogSearch - speaker, text and context search over a dialog corpus
//!
//! Serves a fixed, ordered corpus of dialog lines. Lines carry public ids
//! that ascend but leave gaps; each gap-free run of ids is one scene, and
//! a "context" search returns the whole scene around a line.
//!
//! # Architecture
//!
//! ```text
//! HTTP / CLI ──► QueryPlanner ──► StoreSession (dialogstore, SQLite)
//!                    │
//!                    └──► ContiguityIndex (runs of consecutive ids, cached per corpus version)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dialogsearch::{PlannerConfig, QueryPlanner, SearchRequest};
//! use dialogstore::SqliteStore;
//!
//! let planner = QueryPlanner::new(Arc::new(SqliteStore::open("data.db")?), PlannerConfig::default());
//! let scene = planner.search(&SearchRequest { id: Some(1042), context: true, ..Default::default() })?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod contiguity;
pub mod error;
pub mod planner;

pub use contiguity::{ContiguityError, ContiguityIndex, Run};
pub use error::{Result, SearchError};
pub use planner::{PlannerConfig, QueryPlanner, SearchRequest, SearchResult, SpeakerRequest};
