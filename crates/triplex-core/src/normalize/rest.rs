// ── REST structural inference ──
//
// Arbitrary JSON carries no schema, so the value is classified once into
// a closed set of shapes and each shape has exactly one conversion.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};

use super::coerce::{as_number, timestamp_or_now};
use crate::model::{Field, Frame, FrameType};

/// Keys recognized as a row timestamp, in priority order.
pub const TIME_KEYS: [&str; 5] = ["time", "timestamp", "date", "ts", "datetime"];

/// Step used to synthesize timestamps when the query gave no interval.
pub const DEFAULT_SYNTH_STEP: Duration = Duration::from_secs(15);

/// Query-side inputs to the conversion.
#[derive(Debug, Clone, Copy)]
pub struct RestContext {
    /// Range start; synthesized timestamps count up from here.
    pub from: DateTime<Utc>,
    pub interval: Duration,
}

impl RestContext {
    pub fn new(from: DateTime<Utc>, interval: Option<Duration>) -> Self {
        Self {
            from,
            interval: interval.unwrap_or(DEFAULT_SYNTH_STEP),
        }
    }

    /// `from + interval * row`.
    fn synthesized(&self, row: usize) -> DateTime<Utc> {
        let step = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::zero());
        i32::try_from(row)
            .ok()
            .and_then(|n| step.checked_mul(n))
            .and_then(|offset| self.from.checked_add_signed(offset))
            .unwrap_or(self.from)
    }
}

/// Structural class of a REST answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonShape<'a> {
    /// Non-empty array whose first element is an object.
    ArrayOfObjects(&'a [Value]),
    /// Non-empty array whose first element is anything else.
    ArrayOfScalars(&'a [Value]),
    EmptyArray,
    /// `{"data": [...]}`; the inner array is classified again.
    DataEnvelope(&'a [Value]),
    /// Any other object.
    Object(&'a Map<String, Value>),
    /// Number, string, boolean or null.
    Scalar(&'a Value),
}

impl<'a> JsonShape<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::classify_array(items),
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(inner)) => Self::DataEnvelope(inner),
                _ => Self::Object(map),
            },
            other => Self::Scalar(other),
        }
    }

    fn classify_array(items: &'a [Value]) -> Self {
        match items.first() {
            None => Self::EmptyArray,
            Some(Value::Object(_)) => Self::ArrayOfObjects(items),
            Some(_) => Self::ArrayOfScalars(items),
        }
    }
}

/// Convert a parsed REST answer into exactly one frame.
pub fn rest_frames(value: &Value, ctx: &RestContext) -> Vec<Frame> {
    vec![shape_to_frame(JsonShape::classify(value), ctx)]
}

fn shape_to_frame(shape: JsonShape<'_>, ctx: &RestContext) -> Frame {
    match shape {
        JsonShape::ArrayOfObjects(items) => objects_frame(items, ctx),
        JsonShape::ArrayOfScalars(items) => {
            Frame::new().with_field(Field::mixed("value", items.to_vec()))
        }
        JsonShape::EmptyArray => Frame::new().with_field(Field::mixed("value", Vec::new())),
        JsonShape::DataEnvelope(inner) => shape_to_frame(JsonShape::classify_array(inner), ctx),
        JsonShape::Object(map) => map
            .iter()
            .fold(Frame::new().with_type(FrameType::Table), |frame, (key, value)| {
                frame.with_field(Field::mixed(key.as_str(), vec![value.clone()]))
            }),
        JsonShape::Scalar(value) => Frame::new()
            .with_field(Field::time("time", vec![Utc::now()]))
            .with_field(Field::mixed("value", vec![value.clone()])),
    }
}

fn is_time_key(key: &str) -> bool {
    TIME_KEYS.contains(&key)
}

fn row_time(row: &Map<String, Value>) -> Option<&Value> {
    TIME_KEYS.iter().find_map(|key| row.get(*key))
}

/// Time series if any row has a time key, table otherwise.
///
/// Numeric columns come from the first row, in its key order. Every
/// later row is matched to them by name; a row missing a column, or
/// holding a non-numeric value there, yields `None` in that slot.
/// Elements that are not objects are skipped.
fn objects_frame(items: &[Value], ctx: &RestContext) -> Frame {
    let rows: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();

    let columns: Vec<&str> = rows.first().map_or_else(Vec::new, |first| {
        first
            .iter()
            .filter(|(key, value)| !is_time_key(key) && as_number(value).is_some())
            .map(|(key, _)| key.as_str())
            .collect()
    });

    let has_time = rows.iter().any(|row| row_time(row).is_some());

    let mut frame = Frame::new().with_type(if has_time {
        FrameType::TimeSeries
    } else {
        FrameType::Table
    });

    if has_time {
        let times = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| match row_time(row) {
                Some(value) => timestamp_or_now(value),
                None => ctx.synthesized(idx),
            })
            .collect();
        frame = frame.with_field(Field::time("time", times));
    }

    for column in columns {
        let values = rows
            .iter()
            .map(|row| row.get(column).and_then(as_number))
            .collect();
        frame = frame.with_field(Field::number(column, values));
    }

    frame
}
