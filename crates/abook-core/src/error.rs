//! Error types for the address book.
//!
//! One error type with explicit variants for validation, lookup, duplicate,
//! state and connection failures, so callers can react to each case.

use std::fmt;
use thiserror::Error;

/// The unified error type for address book operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input (card payload, clause, identifiers, URLs).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The target of an operation does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// An identifier collided with an existing one.
    #[error("duplicate: {0}")]
    Duplicate(#[from] DuplicateError),

    /// The operation is not valid in the target's current state.
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidStateError),

    /// Transport-level failure between the client stub and the service.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The service answered with something the client did not expect.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Stable wire code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "ValidationError",
            Error::NotFound(_) => "NotFoundError",
            Error::Duplicate(_) => "DuplicateError",
            Error::InvalidState(_) => "InvalidStateError",
            Error::Connection(_) => "ConnectionError",
            Error::Protocol(_) => "ProtocolError",
        }
    }

    /// Message of the inner error, without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::NotFound(e) => e.to_string(),
            Error::Duplicate(e) => e.to_string(),
            Error::InvalidState(e) => e.to_string(),
            Error::Connection(e) => e.to_string(),
            Error::Protocol(e) => e.to_string(),
        }
    }

    /// Rebuild an error from a wire code and message.
    ///
    /// Unknown codes become a [`ProtocolError`] carrying `status`.
    pub fn from_code(status: u16, code: Option<&str>, message: Option<String>) -> Self {
        let text = message.clone().unwrap_or_default();
        match code {
            Some("ValidationError") => ValidationError::Other { message: text }.into(),
            Some("NotFoundError") => NotFoundError::Other { message: text }.into(),
            Some("DuplicateError") => DuplicateError::Other { message: text }.into(),
            Some("InvalidStateError") => InvalidStateError::Other { message: text }.into(),
            other => ProtocolError::new(status, other.map(str::to_string), message).into(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The payload is not a well-formed card.
    #[error("invalid card: {reason}")]
    Card { reason: String },

    /// The filter clause could not be parsed.
    #[error("invalid clause '{clause}': {reason}")]
    Clause { clause: String, reason: String },

    /// Invalid contact identifier.
    #[error("invalid contact id '{value}': {reason}")]
    ContactId { value: String, reason: String },

    /// Invalid source identifier.
    #[error("invalid source id '{value}': {reason}")]
    SourceId { value: String, reason: String },

    /// Invalid service URL.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}

/// Lookup failures.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// No source with this id.
    #[error("source '{id}'")]
    Source { id: String },

    /// A write needed the primary source and none is registered.
    #[error("no primary source registered")]
    PrimarySource,

    /// No view with this handle was ever opened.
    #[error("view {handle}")]
    View { handle: String },

    #[error("{message}")]
    Other { message: String },
}

/// Identifier collisions.
#[derive(Debug, Error)]
pub enum DuplicateError {
    /// A source with this id is already registered.
    #[error("source '{id}' already exists")]
    Source { id: String },

    #[error("{message}")]
    Other { message: String },
}

/// Operations attempted in the wrong state.
#[derive(Debug, Error)]
pub enum InvalidStateError {
    /// The view was closed by its owner.
    #[error("view {handle} is closed")]
    ViewClosed { handle: String },

    #[error("{message}")]
    Other { message: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The service could not be reached.
    #[error("connection failed: {message}")]
    Connect { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP failure.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The event stream was closed underneath the subscriber.
    #[error("stream closed: {message}")]
    Closed { message: String },
}

/// Unexpected responses from the service.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error code (if present).
    pub error: Option<String>,
    /// Error message from the service.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_wire_form() {
        let err: Error = NotFoundError::Source {
            id: "S1".to_string(),
        }
        .into();
        let rebuilt = Error::from_code(404, Some(err.code()), Some(err.detail()));
        assert!(matches!(rebuilt, Error::NotFound(_)));
        assert_eq!(rebuilt.to_string(), "not found: source 'S1'");
    }

    #[test]
    fn unknown_code_becomes_protocol_error() {
        let err = Error::from_code(500, Some("Teapot"), None);
        match err {
            Error::Protocol(p) => {
                assert_eq!(p.status, 500);
                assert_eq!(p.error.as_deref(), Some("Teapot"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
