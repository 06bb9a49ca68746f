//! Dialog record type

use serde::{Deserialize, Serialize};

/// A single dialog line as persisted in the store
///
/// Field names on the wire follow the dataset's historical column names:
/// `index` for the internal sequence key and `idx` for the public id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRecord {
    /// Database-internal ordering key, not an identity
    #[serde(rename = "index")]
    pub sequence_key: i64,

    /// Unique public identifier; ascending but not contiguous
    #[serde(rename = "idx")]
    pub id: i64,

    pub speaker: Option<String>,

    pub text: Option<String>,
}

impl DialogRecord {
    pub fn new(sequence_key: i64, id: i64, speaker: Option<&str>, text: Option<&str>) -> Self {
        Self {
            sequence_key,
            id,
            speaker: speaker.map(str::to_string),
            text: text.map(str::to_string),
        }
    }
}
