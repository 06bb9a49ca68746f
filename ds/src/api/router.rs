use axum::{Router, routing::get};
use dialogstore::RecordStore;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::planner::QueryPlanner;

use super::handlers::*;

/// Application state shared across all handlers
pub struct AppState<S: RecordStore> {
    pub planner: Arc<QueryPlanner<S>>,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(planner: QueryPlanner<S>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router<S: RecordStore>(state: AppState<S>, cors: bool) -> Router {
    let state = Arc::new(state);

    let router = Router::new()
        // Search
        .route("/dialog", get(dialog::<S>))
        .route("/speakers", get(speakers::<S>))
        // Legacy paths
        .route("/api/dialog", get(dialog::<S>))
        .route("/api/dialog/", get(dialog::<S>))
        .route("/api/speakers", get(speakers::<S>))
        .route("/api/speakers/", get(speakers::<S>))
        // Health
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
