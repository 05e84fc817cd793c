// ── Query model ──
//
// `DataQuery` is the loose inbound shape: an identifier and an untyped
// payload. `Query::parse` turns it into the typed tagged union the
// router dispatches on, so a malformed field fails only its own query.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Time bounds of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// A zero-width range, which makes metrics queries instant.
    pub fn instant(at: DateTime<Utc>) -> Self {
        Self { from: at, to: at }
    }

    pub fn is_instant(&self) -> bool {
        self.from == self.to
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::instant(Utc::now())
    }
}

/// One query as it arrives in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    pub ref_id: String,
    /// `queryType`, `timeRange`, `intervalMs` and the type-specific fields.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Declared query type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum QueryType {
    #[strum(to_string = "prometheus", serialize = "metrics")]
    Metrics,
    #[strum(to_string = "loki", serialize = "logs")]
    Logs,
    #[strum(to_string = "rest")]
    Rest,
}

/// Payload of a metrics query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetricsQuery {
    #[serde(rename = "promQL", default)]
    pub expr: String,
}

/// Payload of a logs query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogsQuery {
    #[serde(rename = "logQL", default)]
    pub expr: String,
}

/// Payload of a REST query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestQuery {
    #[serde(rename = "restEndpoint")]
    pub endpoint: String,
    #[serde(rename = "restMethod")]
    pub method: Option<String>,
    #[serde(rename = "restHeaders")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(rename = "restBody")]
    pub body: Option<String>,
}

/// Type-specific part of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Metrics(MetricsQuery),
    Logs(LogsQuery),
    Rest(RestQuery),
}

impl QueryKind {
    pub fn query_type(&self) -> QueryType {
        match self {
            Self::Metrics(_) => QueryType::Metrics,
            Self::Logs(_) => QueryType::Logs,
            Self::Rest(_) => QueryType::Rest,
        }
    }
}

/// A validated, typed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub ref_id: String,
    pub time_range: TimeRange,
    pub interval: Option<Duration>,
    pub kind: QueryKind,
}

impl Query {
    /// Read the `queryType` tag and decode the matching payload.
    ///
    /// A missing or non-string tag, or a payload that does not decode,
    /// is a [`CoreError::Parse`]; an unknown tag is
    /// [`CoreError::UnsupportedQueryType`].
    pub fn parse(query: &DataQuery) -> Result<Self, CoreError> {
        let tag = match query.payload.get("queryType") {
            Some(serde_json::Value::String(tag)) if !tag.is_empty() => tag.as_str(),
            None | Some(serde_json::Value::Null) => {
                return Err(CoreError::parse("failed to parse query: missing queryType"));
            }
            Some(serde_json::Value::String(_)) => {
                return Err(CoreError::parse("failed to parse query: empty queryType"));
            }
            Some(other) => {
                return Err(CoreError::parse(format!(
                    "failed to parse query: queryType must be a string, got {other}"
                )));
            }
        };

        let query_type: QueryType = tag.parse().map_err(|_| CoreError::UnsupportedQueryType {
            query_type: tag.to_owned(),
        })?;

        let payload = serde_json::Value::Object(query.payload.clone());
        let kind = match query_type {
            QueryType::Metrics => QueryKind::Metrics(decode(payload)?),
            QueryType::Logs => QueryKind::Logs(decode(payload)?),
            QueryType::Rest => QueryKind::Rest(decode(payload)?),
        };

        let time_range: Option<TimeRange> = field(&query.payload, "timeRange")?;
        let interval_ms: Option<u64> = field(&query.payload, "intervalMs")?;

        Ok(Self {
            ref_id: query.ref_id.clone(),
            time_range: time_range.unwrap_or_default(),
            interval: interval_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            kind,
        })
    }
}

/// Decode an optional payload field; absent and `null` are both `None`.
fn field<T: serde::de::DeserializeOwned>(
    payload: &serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Result<Option<T>, CoreError> {
    match payload.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| CoreError::parse(format!("failed to parse query: {name}: {e}"))),
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: serde_json::Value) -> Result<T, CoreError> {
    serde_json::from_value(payload)
        .map_err(|e| CoreError::parse(format!("failed to parse query: {e}")))
}
