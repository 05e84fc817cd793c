// Prometheus-style results → time series frames.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use triplex_api::prometheus::{QueryData, Sample};

use super::coerce::from_unix_seconds;
use crate::error::CoreError;
use crate::model::{Field, Frame, FrameType};

/// `__name__`, else `instance`, else `"series"`.
pub fn series_name(metric: &BTreeMap<String, String>) -> String {
    metric
        .get("__name__")
        .or_else(|| metric.get("instance"))
        .cloned()
        .unwrap_or_else(|| "series".into())
}

/// One frame per series. A sample whose value does not parse as a float
/// fails the whole query.
pub fn metric_frames(data: QueryData) -> Result<Vec<Frame>, CoreError> {
    match data {
        QueryData::Matrix(series) => series
            .into_iter()
            .map(|s| series_frame(s.metric, &s.values))
            .collect(),
        QueryData::Vector(samples) => samples
            .into_iter()
            .map(|s| series_frame(s.metric, std::slice::from_ref(&s.value)))
            .collect(),
        QueryData::Scalar(sample) => {
            let (time, value) = decode_sample(&sample)?;
            Ok(vec![
                Frame::named("scalar")
                    .with_field(Field::time("time", vec![time]))
                    .with_field(Field::number("value", vec![Some(value)])),
            ])
        }
        QueryData::String(Sample(t, text)) => {
            let time = decode_time(t)?;
            Ok(vec![
                Frame::named("string")
                    .with_field(Field::time("time", vec![time]))
                    .with_field(Field::string("value", vec![text])),
            ])
        }
    }
}

fn series_frame(metric: BTreeMap<String, String>, samples: &[Sample]) -> Result<Frame, CoreError> {
    let mut times = Vec::with_capacity(samples.len());
    let mut values = Vec::with_capacity(samples.len());
    for sample in samples {
        let (time, value) = decode_sample(sample)?;
        times.push(time);
        values.push(Some(value));
    }

    let name = series_name(&metric);
    Ok(Frame::new()
        .with_field(Field::time("time", times))
        .with_field(
            Field::number("value", values)
                .with_labels(metric)
                .with_display_name(name),
        )
        .with_type(FrameType::TimeSeries))
}

fn decode_sample(Sample(t, raw): &Sample) -> Result<(DateTime<Utc>, f64), CoreError> {
    let time = decode_time(*t)?;
    let value = raw
        .parse::<f64>()
        .map_err(|e| CoreError::parse(format!("failed to parse value '{raw}': {e}")))?;
    Ok((time, value))
}

fn decode_time(t: f64) -> Result<DateTime<Utc>, CoreError> {
    from_unix_seconds(t).ok_or_else(|| CoreError::parse(format!("invalid sample timestamp {t}")))
}
