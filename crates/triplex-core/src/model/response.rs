// ── Query results ──
//
// One `DataResponse` per query identifier. Errors are values here: a
// failed query never turns the whole batch into an `Err`.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use super::frame::Frame;
use crate::error::CoreError;

/// Outcome of a single query.
#[derive(Debug, Clone)]
pub enum DataResponse {
    Frames(Vec<Frame>),
    Error(CoreError),
}

impl DataResponse {
    pub fn frames(&self) -> Option<&[Frame]> {
        match self {
            Self::Frames(frames) => Some(frames),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Frames(_) => None,
            Self::Error(err) => Some(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<Result<Vec<Frame>, CoreError>> for DataResponse {
    fn from(result: Result<Vec<Frame>, CoreError>) -> Self {
        match result {
            Ok(frames) => Self::Frames(frames),
            Err(err) => Self::Error(err),
        }
    }
}

/// `{"frames": [...]}` or `{"error": "...", "errorKind": "..."}`.
impl Serialize for DataResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Frames(frames) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("frames", frames)?;
                map.end()
            }
            Self::Error(err) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", &err.to_string())?;
                map.serialize_entry("errorKind", err.kind())?;
                map.end()
            }
        }
    }
}

/// Results of one batch, keyed by query identifier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryDataResponse {
    #[serde(rename = "results")]
    pub responses: BTreeMap<String, DataResponse>,
}

impl QueryDataResponse {
    /// Record a result. A repeated identifier replaces the earlier entry.
    pub fn insert(&mut self, ref_id: impl Into<String>, response: DataResponse) {
        let ref_id = ref_id.into();
        if self.responses.insert(ref_id.clone(), response).is_some() {
            warn!(%ref_id, "duplicate query identifier in batch, keeping the last result");
        }
    }

    pub fn get(&self, ref_id: &str) -> Option<&DataResponse> {
        self.responses.get(ref_id)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Number of queries that failed.
    pub fn error_count(&self) -> usize {
        self.responses.values().filter(|r| r.is_error()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataResponse)> {
        self.responses.iter().map(|(k, v)| (k.as_str(), v))
    }
}
