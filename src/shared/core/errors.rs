// Errors crossing a port boundary.
//
// Every port (record service, roster service, export service) reports failures
// with ServiceError, whether the adapter is HTTP backed or in memory. Use cases
// wrap it in their own error enums.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to list of messages, the shape a 400 response body carries.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("session expired")]
    SessionExpired,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        ServiceError::Validation(errors)
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
