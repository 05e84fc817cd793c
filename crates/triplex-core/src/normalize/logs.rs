// Loki-style results → log-line frames.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use triplex_api::loki::{LogQueryData, Stream};
use triplex_api::prometheus::QueryData;

use super::metrics::metric_frames;
use crate::error::CoreError;
use crate::model::{Field, Frame, FrameType};

/// `job`, else `instance`, else the first label value, else `"logs"`.
pub fn log_series_name(labels: &BTreeMap<String, String>) -> String {
    labels
        .get("job")
        .or_else(|| labels.get("instance"))
        .or_else(|| labels.values().next())
        .cloned()
        .unwrap_or_else(|| "logs".into())
}

/// One frame per stream that has at least one usable entry.
///
/// Metric-style LogQL answers (`matrix`, `vector`) are handed to the
/// metrics normalizer.
pub fn log_frames(data: LogQueryData) -> Result<Vec<Frame>, CoreError> {
    match data {
        LogQueryData::Streams(streams) => {
            Ok(streams.into_iter().filter_map(stream_frame).collect())
        }
        LogQueryData::Matrix(series) => metric_frames(QueryData::Matrix(series)),
        LogQueryData::Vector(samples) => metric_frames(QueryData::Vector(samples)),
    }
}

fn stream_frame(stream: Stream) -> Option<Frame> {
    let mut times = Vec::with_capacity(stream.values.len());
    let mut lines = Vec::with_capacity(stream.values.len());

    for entry in &stream.values {
        let [ts, line, ..] = entry.as_slice() else {
            debug!(len = entry.len(), "skipping short log entry");
            continue;
        };
        let Some(time) = parse_nanos(ts) else {
            warn!(value = %ts, "failed to parse log timestamp, skipping entry");
            continue;
        };
        times.push(time);
        lines.push(match line {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }

    if times.is_empty() {
        return None;
    }

    let name = log_series_name(&stream.stream);
    Some(
        Frame::new()
            .with_field(Field::time("time", times))
            .with_field(
                Field::string("line", lines)
                    .with_labels(stream.stream.clone())
                    .with_display_name(name),
            )
            .with_type(FrameType::LogLines)
            .with_labels(stream.stream),
    )
}

/// Nanosecond epoch, as a string (the wire form) or a number.
fn parse_nanos(value: &Value) -> Option<DateTime<Utc>> {
    let nanos = match value {
        Value::String(s) => s.parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    Some(DateTime::from_timestamp_nanos(nanos))
}
