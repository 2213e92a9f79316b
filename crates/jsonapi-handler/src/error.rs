//! # Handler Errors
//!
//! Every failure the handler produces is one of three things:
//!
//! - a [`StatusError`], tagged with the HTTP status code the protocol requires,
//! - an [`AdapterError`] passed through from the persistence layer untouched,
//! - an unimplemented addressing path.
//!
//! Only [`StatusError`] carries protocol meaning. Callers rendering a response
//! use [`HandlerError::status`] and fall back to 500 for everything else.

use http::StatusCode;

/// A protocol failure tagged with its HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct StatusError {
    pub status: StatusCode,
    pub message: String,
}

impl StatusError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }
}

/// Errors surfaced by an [`Adapter`](crate::Adapter) implementation.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("{0}")]
    Store(String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by the public [`RequestHandler`](crate::RequestHandler) operations.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

impl HandlerError {
    /// The status code to answer with. Untagged failures map to 500.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Status(e) => e.status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the error carries an explicit protocol status.
    pub fn is_tagged(&self) -> bool {
        matches!(self, HandlerError::Status(_))
    }
}

/// Heuristic for NOT NULL constraint violations reported by the store.
///
/// Stores report these as free text, so this matches on the message alone and
/// will also catch unrelated errors that happen to mention "null". Keep every
/// caller going through this predicate so it can be swapped for a structured
/// error code later.
pub fn is_not_null_violation(err: &AdapterError) -> bool {
    err.to_string().to_ascii_lowercase().contains("null")
}

/// Errors raised while loading a [`ResourceConfig`](crate::ResourceConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid resource config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Resource config is missing a type name")]
    MissingTypeName,
}
