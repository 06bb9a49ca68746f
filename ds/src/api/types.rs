//! Request and response shapes for the HTTP surface
//!
//! Legacy parameter names (`speaker`, `include_neighbors`) are folded into
//! the canonical request here and go no further.

use serde::{Deserialize, Serialize};

use crate::planner::{SearchRequest, SpeakerRequest};

/// Separator between terms in `speakers` and `text`
pub const TERM_DELIMITER: &str = "//";

/// Query parameters for `GET /dialog`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialogParams {
    pub idx: Option<i64>,

    /// `//`-joined speaker substrings
    pub speakers: Option<String>,

    /// Deprecated single speaker, used only when `speakers` is absent
    pub speaker: Option<String>,

    /// `//`-joined text substrings
    pub text: Option<String>,

    #[serde(default)]
    pub context: bool,

    /// Deprecated alias of `context`
    #[serde(default)]
    pub include_neighbors: bool,

    pub offset: Option<i64>,

    pub limit: Option<i64>,
}

/// Query parameters for `GET /speakers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakerParams {
    pub query: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// A parameter the planner never sees because it is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamError(pub String);

impl DialogParams {
    pub fn into_request(self) -> Result<SearchRequest, ParamError> {
        let (offset, limit) = pagination(self.offset, self.limit)?;
        let speakers = self.speakers.or(self.speaker);

        Ok(SearchRequest {
            id: self.idx,
            speakers: speakers.as_deref().map(split_terms).unwrap_or_default(),
            text_terms: self.text.as_deref().map(split_terms).unwrap_or_default(),
            context: self.context || self.include_neighbors,
            offset,
            limit,
        })
    }
}

impl SpeakerParams {
    pub fn into_request(self) -> Result<SpeakerRequest, ParamError> {
        let (offset, limit) = pagination(self.offset, self.limit)?;
        Ok(SpeakerRequest {
            query: self.query,
            offset,
            limit,
        })
    }
}

/// Split a delimiter-joined term list, dropping empty segments
pub fn split_terms(joined: &str) -> Vec<String> {
    joined
        .split(TERM_DELIMITER)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn pagination(offset: Option<i64>, limit: Option<i64>) -> Result<(u64, Option<u64>), ParamError> {
    let offset = match offset {
        None => 0,
        Some(v) => u64::try_from(v).map_err(|_| ParamError(format!("offset must be non-negative, got {}", v)))?,
    };
    let limit = limit
        .map(|v| u64::try_from(v).map_err(|_| ParamError(format!("limit must be non-negative, got {}", v))))
        .transpose()?;
    Ok((offset, limit))
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_terms() {
        assert_eq!(split_terms("Ana//Bob"), vec!["Ana", "Bob"]);
        assert_eq!(split_terms("Ana//"), vec!["Ana"]);
        assert_eq!(split_terms("//"), Vec::<String>::new());
        assert_eq!(split_terms("a/b"), vec!["a/b"]);
    }

    #[test]
    fn test_speakers_wins_over_legacy_speaker() {
        let params = DialogParams {
            speakers: Some("Ana//Bob".to_string()),
            speaker: Some("Cleo".to_string()),
            ..Default::default()
        };
        let req = params.into_request().unwrap();
        assert_eq!(req.speakers, vec!["Ana", "Bob"]);
    }

    #[test]
    fn test_legacy_speaker_fallback() {
        let params = DialogParams {
            speaker: Some("Cleo".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_request().unwrap().speakers, vec!["Cleo"]);
    }

    #[test]
    fn test_include_neighbors_maps_to_context() {
        let params = DialogParams {
            idx: Some(4),
            include_neighbors: true,
            ..Default::default()
        };
        let req = params.into_request().unwrap();
        assert!(req.context);
        assert_eq!(req.id, Some(4));
    }

    #[test]
    fn test_defaults() {
        let req = DialogParams::default().into_request().unwrap();
        assert_eq!(req, SearchRequest::default());
    }

    #[test]
    fn test_negative_pagination_rejected() {
        let params = DialogParams {
            offset: Some(-1),
            ..Default::default()
        };
        let err = params.into_request().unwrap_err();
        assert!(err.0.contains("offset"));

        let params = SpeakerParams {
            limit: Some(-5),
            ..Default::default()
        };
        let err = params.into_request().unwrap_err();
        assert!(err.0.contains("limit"));
    }

    #[test]
    fn test_query_string_deserialize() {
        let params: DialogParams =
            parse_query("idx=12&speakers=Ana%2F%2FBob&context=true&offset=10&limit=5");
        assert_eq!(params.idx, Some(12));
        assert_eq!(params.speakers.as_deref(), Some("Ana//Bob"));
        assert!(params.context);
        assert_eq!(params.offset, Some(10));
        assert_eq!(params.limit, Some(5));
    }

    fn parse_query(query: &str) -> DialogParams {
        let uri: axum::http::Uri = format!("http://localhost/dialog?{}", query).parse().unwrap();
        let axum::extract::Query(params) = axum::extract::Query::<DialogParams>::try_from_uri(&uri).unwrap();
        params
    }
}
