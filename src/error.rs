use serde::Serialize;
use uuid::Uuid;

/// Domain and validation errors raised by the parse pipeline.
///
/// Each variant maps to a stable string code via [`ParseError::code`]. The
/// codes are a published API contract and must never be renamed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("tag validation failed: closing tag </{tag}> at byte {position} has no matching opening tag")]
    MismatchedClosingTag { tag: String, position: usize },

    #[error("tag validation failed: {} unclosed tag(s) detected: {}", .tags.len(), .tags.join(", "))]
    UnclosedTags { tags: Vec<String> },

    #[error("malformed expense block: {detail}")]
    MalformedIsland { detail: String },

    #[error("document type and entity declarations are prohibited")]
    ForbiddenDeclaration,

    #[error("input size exceeds the maximum allowed limit of {limit} bytes")]
    InputTooLarge { limit: usize },

    #[error("a <total> value is required for expense processing")]
    MissingTotal,

    #[error("text is empty or contains only whitespace")]
    EmptyText,

    #[error("invalid request: {detail}")]
    InvalidRequest { detail: String },

    #[error("invalid number: {input:?} could not be parsed as a decimal amount")]
    InvalidNumber { input: String },

    #[error("tax rate is required but was not provided in the request or configuration")]
    MissingTaxRate,

    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl ParseError {
    /// Stable error code surfaced to callers. Never rename these.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::MismatchedClosingTag { .. } | ParseError::UnclosedTags { .. } => {
                "UNCLOSED_TAGS"
            }
            ParseError::MalformedIsland { .. } | ParseError::ForbiddenDeclaration => {
                "MALFORMED_TAGS"
            }
            ParseError::InputTooLarge { .. }
            | ParseError::InvalidRequest { .. }
            | ParseError::InvalidNumber { .. } => "INVALID_REQUEST",
            ParseError::MissingTotal => "MISSING_TOTAL",
            ParseError::EmptyText => "EMPTY_TEXT",
            ParseError::MissingTaxRate => "MISSING_TAXRATE",
            ParseError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Caller-facing error shape with the code preserved verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub correlation_id: Uuid,
    pub error_code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Maps a [`ParseError`] to its outward shape. Internal errors are logged
    /// with full detail but surfaced only as a generic message.
    pub fn from_error(error: &ParseError, correlation_id: Uuid) -> Self {
        let message = match error {
            ParseError::Internal { detail } => {
                log::error!("internal error; correlation_id={correlation_id}: {detail}");
                "an unexpected error occurred while processing the request".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse {
            correlation_id,
            error_code: error.code().to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ParseError::UnclosedTags { tags: vec!["total".into()] }.code(),
            "UNCLOSED_TAGS"
        );
        assert_eq!(ParseError::MissingTotal.code(), "MISSING_TOTAL");
        assert_eq!(ParseError::EmptyText.code(), "EMPTY_TEXT");
        assert_eq!(ParseError::MissingTaxRate.code(), "MISSING_TAXRATE");
        assert_eq!(
            ParseError::Internal { detail: "boom".into() }.code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn internal_detail_is_not_surfaced() {
        let err = ParseError::Internal {
            detail: "lock poisoned".into(),
        };
        let response = ErrorResponse::from_error(&err, Uuid::new_v4());
        assert_eq!(response.error_code, "INTERNAL_ERROR");
        assert!(!response.message.contains("lock poisoned"));
    }

    #[test]
    fn validation_detail_is_surfaced() {
        let err = ParseError::MismatchedClosingTag {
            tag: "total".into(),
            position: 42,
        };
        let response = ErrorResponse::from_error(&err, Uuid::new_v4());
        assert_eq!(response.error_code, "UNCLOSED_TAGS");
        assert!(response.message.contains("</total>"));
    }
}
