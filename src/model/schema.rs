use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::record::{FieldValue, Record, RecordError};
use crate::error::ValidationError;

/// Fields owned by the store; drafts may never carry them
const SYSTEM_FIELDS: &[&str] = &["id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    TextList,
    Timestamp,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Bool => "boolean",
            FieldKind::TextList => "list of text",
            FieldKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Declared field of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: false }
    }
}

/// Declared shape of one collection's documents
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Parse a raw store document into a typed record.
    ///
    /// Declared fields are coerced to their kind; undeclared fields are kept
    /// when they hold plain text, numbers, booleans or lists of text.
    pub fn parse(&self, doc: Value) -> Result<Record, RecordError> {
        let mut map = match doc {
            Value::Object(map) => map,
            _ => return Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        };

        let id = match map.remove("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(RecordError::MissingId),
        };

        let mut fields = BTreeMap::new();
        for spec in self.fields {
            let value = match map.remove(spec.name) {
                Some(raw) => parse_value(spec.name, spec.kind, &raw)?,
                None => None,
            };

            match value {
                Some(v) if spec.required && v.is_blank() => {
                    return Err(RecordError::MissingRequiredField(spec.name.to_string()))
                }
                Some(v) => {
                    fields.insert(spec.name.to_string(), v);
                }
                None if spec.required => {
                    return Err(RecordError::MissingRequiredField(spec.name.to_string()))
                }
                None => {}
            }
        }

        for (key, raw) in map {
            if let Some(value) = infer_value(&raw) {
                fields.insert(key, value);
            }
        }

        Ok(Record::new(id, fields))
    }

    /// Parse a fetched document list, excluding documents that do not fit the schema
    pub fn parse_all(&self, collection: &str, docs: Vec<Value>) -> Vec<Record> {
        let total = docs.len();
        let records: Vec<Record> = docs
            .into_iter()
            .enumerate()
            .filter_map(|(index, doc)| match self.parse(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping {} document #{}: {}", collection, index, e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            tracing::warn!(
                "Excluded {} of {} {} documents that failed schema validation",
                total - records.len(),
                total,
                collection
            );
        }
        records
    }

    /// Validate an editor draft and normalise it into the payload sent to the store
    pub fn validate_draft(&self, draft: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut errors = Vec::new();
        let mut payload = Map::new();

        for key in draft.keys() {
            if SYSTEM_FIELDS.contains(&key.as_str()) {
                errors.push(RecordError::SystemFieldNotAllowed(key.clone()));
            }
        }

        for spec in self.fields {
            let raw = draft.get(spec.name);
            match raw.map(|r| parse_value(spec.name, spec.kind, r)) {
                Some(Ok(Some(value))) if spec.required && value.is_blank() => {
                    errors.push(RecordError::MissingRequiredField(spec.name.to_string()));
                }
                Some(Ok(Some(value))) => {
                    payload.insert(spec.name.to_string(), value.to_json());
                }
                Some(Ok(None)) | None if spec.required => {
                    errors.push(RecordError::MissingRequiredField(spec.name.to_string()));
                }
                Some(Ok(None)) => {
                    payload.insert(spec.name.to_string(), Value::Null);
                }
                None => {}
                Some(Err(e)) => errors.push(e),
            }
        }

        let field_errors: BTreeMap<String, String> = errors
            .into_iter()
            .flat_map(|e| ValidationError::from(e).field_errors)
            .collect();

        if !field_errors.is_empty() {
            return Err(ValidationError::new(field_errors));
        }

        for (key, value) in draft {
            if self.field(key).is_none() && !SYSTEM_FIELDS.contains(&key.as_str()) {
                payload.insert(key.clone(), value.clone());
            }
        }

        Ok(payload)
    }
}

/// Coerce a raw JSON value into the declared kind; null means absent
fn parse_value(field: &str, kind: FieldKind, raw: &Value) -> Result<Option<FieldValue>, RecordError> {
    if raw.is_null() {
        return Ok(None);
    }

    let value = match (kind, raw) {
        (FieldKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (FieldKind::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),
        (FieldKind::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (FieldKind::Number, Value::String(s)) => s.trim().parse::<f64>().ok().map(FieldValue::Number),
        (FieldKind::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        (FieldKind::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(FieldValue::Bool(true)),
            "false" | "no" | "0" => Some(FieldValue::Bool(false)),
            _ => None,
        },
        (FieldKind::TextList, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::TextList),
        (FieldKind::TextList, Value::String(s)) => Some(FieldValue::TextList(vec![s.clone()])),
        (FieldKind::Timestamp, other) => parse_timestamp(other).map(FieldValue::Timestamp),
        _ => None,
    };

    value.map(Some).ok_or_else(|| RecordError::InvalidField {
        field: field.to_string(),
        expected: kind,
        value: raw.to_string(),
    })
}

fn infer_value(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Array(_) => parse_value("", FieldKind::TextList, raw).ok().flatten(),
        Value::Object(_) => parse_timestamp(raw).map(FieldValue::Timestamp),
        Value::Null => None,
    }
}

/// Accepts RFC 3339 strings, plain dates, epoch milliseconds and
/// `{ seconds, nanoseconds }` objects as written by the document store
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}
