// Client-facing error types
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::editor::EditorError;
use crate::gateway::GatewayError;
use crate::model::RecordError;
use crate::session::SessionError;

/// A draft failed the collection's field rules; no gateway call was made
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(field_errors: BTreeMap<String, String>) -> Self {
        let fields: Vec<&str> = field_errors.keys().map(String::as_str).collect();
        Self {
            message: format!("Missing or invalid fields: {}", fields.join(", ")),
            field_errors,
        }
    }

    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), reason.into());
        Self::new(field_errors)
    }
}

impl From<RecordError> for ValidationError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MissingRequiredField(field) => {
                ValidationError::single(field, "This field is required")
            }
            RecordError::InvalidField { ref field, .. } => {
                ValidationError::single(field.clone(), err.to_string())
            }
            RecordError::SystemFieldNotAllowed(ref field) => {
                ValidationError::single(field.clone(), err.to_string())
            }
            RecordError::MissingId => ValidationError::single("id", err.to_string()),
            RecordError::InvalidJson(msg) => ValidationError {
                message: msg,
                field_errors: BTreeMap::new(),
            },
        }
    }
}

/// Everything an admin action can fail with
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl AdminError {
    /// User-facing notification text
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Validation(_) => "VALIDATION_ERROR",
            AdminError::Gateway(e) => e.error_code(),
            AdminError::Session(_) => "SESSION_ERROR",
            AdminError::Editor(_) => "EDITOR_STATE",
        }
    }

    /// Convert to JSON body for machine-readable output
    pub fn to_json(&self) -> Value {
        match self {
            AdminError::Validation(e) => json!({
                "success": false,
                "error": e.message,
                "error_code": self.error_code(),
                "field_errors": e.field_errors,
            }),
            _ => json!({
                "success": false,
                "error": self.message(),
                "error_code": self.error_code(),
            }),
        }
    }
}
