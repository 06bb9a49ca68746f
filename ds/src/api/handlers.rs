use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dialogstore::{DialogRecord, RecordStore};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::SearchError;
use crate::planner::SearchResult;

use super::router::AppState;
use super::types::{DialogParams, ErrorResponse, HealthResponse, ParamError, SpeakerParams};

/// Error wrapper for API handlers
#[derive(Debug)]
pub enum ApiError {
    Search(SearchError),
    Unprocessable(String),
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        ApiError::Search(e)
    }
}

impl From<ParamError> for ApiError {
    fn from(e: ParamError) -> Self {
        ApiError::Unprocessable(e.0)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::Unprocessable(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Search(e) => match e {
                SearchError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg),
                SearchError::NotFound(id) => (StatusCode::NOT_FOUND, "not_found", format!("Dialog not found: {}", id)),
                other => {
                    error!(error = %other, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg),
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Run planner work on the blocking pool; the store session lives and dies inside `f`
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SearchError::TaskFailed(e.to_string()))?
        .map_err(ApiError::from)
}

/// Search dialog lines by speaker, text, id or context
pub async fn dialog<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<DialogParams>, QueryRejection>,
) -> Result<Json<SearchResult<DialogRecord>>, ApiError> {
    let Query(params) = params?;
    let req = params.into_request()?;
    debug!(?req, "dialog: handling request");

    let planner = Arc::clone(&state.planner);
    let result = run_blocking(move || planner.search(&req)).await?;
    Ok(Json(result))
}

/// List distinct speakers
pub async fn speakers<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<SpeakerParams>, QueryRejection>,
) -> Result<Json<SearchResult<String>>, ApiError> {
    let Query(params) = params?;
    let req = params.into_request()?;
    debug!(?req, "speakers: handling request");

    let planner = Arc::clone(&state.planner);
    let result = run_blocking(move || planner.speakers(&req)).await?;
    Ok(Json(result))
}

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
