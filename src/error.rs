//! Error types and handling.

use thiserror::Error;

/// A field-scoped validation failure, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field (e.g. `subDepartments[2].name`).
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (network or non-2xx status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server-reported API error (GraphQL errors array)
    #[error("API error: {0}")]
    Api(String),

    /// No credential is present
    #[error("Not logged in")]
    MissingCredential,

    /// Credential expired or was rejected by the server
    #[error("Session expired or rejected: {0}")]
    Unauthorized(String),

    /// Bearer token could not be decoded
    #[error("Malformed token: {0}")]
    Token(String),

    /// Field-scoped validation failures; submission was blocked
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Unexpected response shape from the server
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

fn format_fields(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a token error with message
    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }
}
