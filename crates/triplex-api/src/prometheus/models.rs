// Wire types for the Prometheus query API.
//
// Loki answers metric-style LogQL with the same shapes, so `loki::models`
// reuses the envelope and series types from here.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::Error;

/// The `{status, data, errorType, error}` envelope around every answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap `data`, turning a non-`success` envelope into [`Error::Envelope`].
    pub fn into_data(self, backend: &'static str) -> Result<T, Error> {
        let succeeded = self.status == "success";
        if let (true, Some(data)) = (succeeded, self.data) {
            return Ok(data);
        }
        let message = match (&self.error_type, self.error) {
            (Some(kind), Some(msg)) => format!("{kind}: {msg}"),
            (None, Some(msg)) => msg,
            (Some(kind), None) => kind.clone(),
            (None, None) if succeeded => "response carried no data".into(),
            (None, None) => format!("status {}", self.status),
        };
        Err(Error::Envelope {
            backend,
            status: self.status,
            error_type: self.error_type,
            message,
        })
    }
}

/// `data` of a query answer, tagged by `resultType`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryData {
    Matrix(Vec<RangeSeries>),
    Vector(Vec<InstantSample>),
    Scalar(Sample),
    String(Sample),
}

impl QueryData {
    pub fn result_type(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "matrix",
            Self::Vector(_) => "vector",
            Self::Scalar(_) => "scalar",
            Self::String(_) => "string",
        }
    }
}

/// One series of a range query.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<Sample>,
}

/// One series of an instant query.
#[derive(Debug, Clone, Deserialize)]
pub struct InstantSample {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    pub value: Sample,
}

/// `[<unix seconds>, "<value>"]`. The value stays a string on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample(pub f64, pub String);
