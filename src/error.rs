// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request validation failures
//!
//! These are the only errors the engine raises. They are produced before
//! any analysis starts, so a caller never sees a partial result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("text: must not be empty or blank")]
    EmptyText,

    #[error("text: length {length} exceeds maximum of {max} characters")]
    TextTooLong { length: usize, max: usize },

    #[error("dialectId: unknown dialect '{dialect_id}'")]
    UnknownDialect { dialect_id: String },

    #[error("{field}: {reason}")]
    MalformedRequest { field: String, reason: String },
}

impl ValidationFailure {
    /// Name of the request field that failed validation
    pub fn field(&self) -> &str {
        match self {
            ValidationFailure::EmptyText | ValidationFailure::TextTooLong { .. } => "text",
            ValidationFailure::UnknownDialect { .. } => "dialectId",
            ValidationFailure::MalformedRequest { field, .. } => field,
        }
    }

    pub(crate) fn from_json_error(err: &serde_json::Error) -> Self {
        let reason = err.to_string();
        // serde names the offending key between backticks for unknown/missing fields
        let field = reason
            .split('`')
            .nth(1)
            .filter(|name| !name.is_empty() && !name.contains(' '))
            .unwrap_or("request")
            .to_string();
        ValidationFailure::MalformedRequest { field, reason }
    }
}
