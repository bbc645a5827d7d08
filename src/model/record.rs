use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::schema::FieldKind;
use crate::listing::{ListItem, SortKey};

/// Errors that can occur while turning store documents into records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Record has no id")]
    MissingId,
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid value for field '{field}': expected {expected}, got {value}")]
    InvalidField {
        field: String,
        expected: FieldKind,
        value: String,
    },
    #[error("System field '{0}' cannot be set")]
    SystemFieldNotAllowed(String),
}

/// A single typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    TextList(Vec<String>),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::TextList(_) => FieldKind::TextList,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Blank values do not satisfy a required field
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::TextList(items) => items.iter().all(|s| s.trim().is_empty()),
            _ => false,
        }
    }

    /// Text the search filter matches against. Booleans are never searchable.
    pub fn search_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s)),
            FieldValue::TextList(items) => Some(Cow::Owned(items.join(" "))),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::Timestamp(ts) => Some(Cow::Owned(ts.format("%Y-%m-%d").to_string())),
            FieldValue::Bool(_) => None,
        }
    }

    /// Human-readable rendering for cards and tables
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(true) => "Yes".to_string(),
            FieldValue::Bool(false) => "No".to_string(),
            FieldValue::TextList(items) => items.join(", "),
            FieldValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    pub fn sort_key(&self) -> SortKey<'_> {
        match self {
            FieldValue::Text(s) => SortKey::Text(Cow::Owned(s.to_lowercase())),
            FieldValue::Number(n) => SortKey::Number(*n),
            FieldValue::Bool(b) => SortKey::Bool(*b),
            FieldValue::TextList(items) => {
                SortKey::Text(Cow::Owned(items.first().map(|s| s.to_lowercase()).unwrap_or_default()))
            }
            FieldValue::Timestamp(ts) => SortKey::Time(*ts),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::TextList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One document from a collection, parsed against the collection schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a text field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Attach a value computed on the client (joined user names and the like)
    pub fn insert_derived(&mut self, key: impl Into<String>, value: FieldValue) -> &mut Self {
        let key = key.into();
        if key == "id" {
            tracing::warn!("Attempted to overwrite record id via derived field - ignoring");
            return self;
        }
        self.fields.insert(key, value);
        self
    }

    /// Display value for a field, with `id` treated as a regular column
    pub fn display_field(&self, key: &str) -> Option<String> {
        if key == "id" {
            return Some(self.id.clone());
        }
        self.get(key).map(FieldValue::display)
    }

    /// Seed an editor draft from this record (id excluded)
    pub fn to_draft(&self) -> Map<String, Value> {
        self.fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    /// Convert to JSON Value including id
    pub fn to_json(&self) -> Value {
        let mut map = self.to_draft();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

impl ListItem for Record {
    fn search_text(&self, field: &str) -> Option<Cow<'_, str>> {
        if field == "id" {
            return Some(Cow::Borrowed(&self.id));
        }
        self.get(field).and_then(FieldValue::search_text)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        if field == "id" {
            return Some(SortKey::Text(Cow::Borrowed(&self.id)));
        }
        self.get(field).map(FieldValue::sort_key)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Record(id: {}, fields: {})", self.id, self.fields.len())
    }
}

/// Convert a list of records to a JSON array
pub fn to_json_array(records: &[Record]) -> Value {
    Value::Array(records.iter().map(Record::to_json).collect())
}
