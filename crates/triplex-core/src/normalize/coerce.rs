// Numeric and timestamp coercion for loosely typed JSON.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Epoch values above this are milliseconds, below are seconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// A native JSON number, or a string that parses completely as a float.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse a timestamp-like value.
///
/// Tried in order: RFC 3339 string, integer string, float string, native
/// number. Numbers above 1e12 are read as epoch milliseconds, anything
/// else as epoch seconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            if let Ok(n) = s.parse::<i64>() {
                return from_epoch_int(n);
            }
            s.parse::<f64>().ok().and_then(from_epoch_float)
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => from_epoch_int(i),
            None => n.as_f64().and_then(from_epoch_float),
        },
        _ => None,
    }
}

/// [`parse_timestamp`], falling back to the current instant.
pub fn timestamp_or_now(value: &Value) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or_else(Utc::now)
}

/// Fractional Unix seconds, as Prometheus reports sample times.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn from_epoch_int(n: i64) -> Option<DateTime<Utc>> {
    if n as f64 > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn from_epoch_float(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    if n > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n.round() as i64)
    } else {
        from_unix_seconds(n)
    }
}
