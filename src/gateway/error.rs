use thiserror::Error;

use crate::types::Operation;

/// A remote call was rejected. Every variant is terminal for the attempt;
/// nothing is retried automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Could not reach the document store during {operation}: {message}")]
    Transport { operation: Operation, message: String },

    #[error("{collection} record '{id}' was not found")]
    NotFound { collection: String, id: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Document store rejected {operation} ({status}): {message}")]
    Rejected {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from the document store: {0}")]
    MalformedResponse(String),

    #[error("Invalid gateway configuration: {0}")]
    Configuration(String),
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Transport { .. } => "GATEWAY_UNAVAILABLE",
            GatewayError::NotFound { .. } => "NOT_FOUND",
            GatewayError::Unauthorized(_) => "UNAUTHORIZED",
            GatewayError::Rejected { .. } => "GATEWAY_REJECTED",
            GatewayError::MalformedResponse(_) => "BAD_GATEWAY",
            GatewayError::Configuration(_) => "GATEWAY_CONFIG",
        }
    }
}
