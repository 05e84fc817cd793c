// ── Frame model ──
//
// The uniform columnar result every backend is normalized into. A frame
// is an ordered list of equally long fields; each field holds values of
// a single element kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a frame's rows should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FrameType {
    /// Rows ordered by an explicit `time` field.
    TimeSeries,
    /// Unordered records, no time field.
    Table,
    /// Raw log lines keyed by timestamp.
    LogLines,
}

/// Display hints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Values of one field. Serialized as `{"type": ..., "values": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    /// `None` marks a row that had no numeric value for this column.
    Number(Vec<Option<f64>>),
    String(Vec<String>),
    /// Untyped JSON values, kept verbatim.
    Mixed(Vec<serde_json::Value>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Time(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::String(v) => v.len(),
            Self::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lower-case element kind, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Time(_) => "time",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Mixed(_) => "mixed",
        }
    }

    /// Render row `idx` for plain-text output.
    pub fn display_at(&self, idx: usize) -> Option<String> {
        match self {
            Self::Time(v) => v.get(idx).map(DateTime::to_rfc3339),
            Self::Number(v) => v
                .get(idx)
                .map(|n| n.map_or_else(String::new, |n| n.to_string())),
            Self::String(v) => v.get(idx).cloned(),
            Self::Mixed(v) => v.get(idx).map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }
}

/// One named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<FieldConfig>,
    #[serde(flatten)]
    pub values: FieldValues,
}

impl Field {
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            config: None,
            values,
        }
    }

    pub fn time(name: impl Into<String>, values: Vec<DateTime<Utc>>) -> Self {
        Self::new(name, FieldValues::Time(values))
    }

    pub fn number(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, FieldValues::Number(values))
    }

    pub fn string(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, FieldValues::String(values))
    }

    pub fn mixed(name: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        Self::new(name, FieldValues::Mixed(values))
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.config = Some(FieldConfig {
            display_name: Some(name.into()),
        });
        self
    }

    /// Display name if one was set, else the field name.
    pub fn display_name(&self) -> &str {
        self.config
            .as_ref()
            .and_then(|c| c.display_name.as_deref())
            .unwrap_or(&self.name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of row-aligned fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<Field>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<FrameType>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = Some(frame_type);
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Rows in the frame (length of the first field).
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, Field::len)
    }
}
