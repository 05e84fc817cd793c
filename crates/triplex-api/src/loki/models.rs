use std::collections::BTreeMap;

use serde::Deserialize;

use crate::prometheus::models::{InstantSample, RangeSeries};

/// `data` of a Loki query answer.
///
/// Log selectors come back as `streams`; metric-style LogQL
/// (`rate(...)`, `count_over_time(...)`) comes back in the Prometheus
/// shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum LogQueryData {
    Streams(Vec<Stream>),
    Matrix(Vec<RangeSeries>),
    Vector(Vec<InstantSample>),
}

/// One labelled log stream.
///
/// Entries are kept loose (`[<ns timestamp>, <line>, ...]`) so a single
/// malformed entry can be skipped without rejecting the whole answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub stream: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}
