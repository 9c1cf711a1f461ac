//! Error types for sqlmem.
//!
//! Every failure that crosses a connector or connection boundary is one of
//! the variants below. Raw driver errors never escape: they are wrapped into
//! [`Error::ConnectorFailure`] with the original kept as the error source.

use std::fmt;

use thiserror::Error;

/// Boxed underlying cause carried by [`Error::ConnectorFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Code classifying a connector failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generic failure reported by the underlying SQL handle.
    SqlError,
}

impl ErrorCode {
    /// Human-readable description of the code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::SqlError => "SQL error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fieldless discriminant of [`Error`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConnectorFailure,
    InvalidArgument,
    IllegalState,
    CollectionNotFound,
    Config,
}

/// Main error type for sqlmem operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying database handle failed (including on close).
    #[error("{}", failure_message(.code, .message))]
    ConnectorFailure {
        code: ErrorCode,
        message: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// Caller-supplied input violated a precondition; no I/O was attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The component is in a state that forbids the operation.
    #[error("{0}")]
    IllegalState(String),

    /// A read or delete referenced a collection that does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn failure_message<'a>(code: &ErrorCode, message: &'a Option<String>) -> &'a str {
    match message {
        Some(message) => message.as_str(),
        None => code.message(),
    }
}

impl Error {
    /// Wrap an underlying cause as a [`ErrorCode::SqlError`] connector failure.
    pub fn connector(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Error::ConnectorFailure {
            code: ErrorCode::SqlError,
            message: Some(message.into()),
            source: Some(cause.into()),
        }
    }

    /// Build a connector failure from its parts; message and cause are optional.
    pub fn connector_failure(
        code: ErrorCode,
        message: Option<String>,
        source: Option<BoxError>,
    ) -> Self {
        Error::ConnectorFailure {
            code,
            message,
            source,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Error::IllegalState(message.into())
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConnectorFailure { .. } => ErrorKind::ConnectorFailure,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::IllegalState(_) => ErrorKind::IllegalState,
            Error::CollectionNotFound(_) => ErrorKind::CollectionNotFound,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Failure code, present only for connector failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::ConnectorFailure { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Explicit message of a connector failure, if one was given.
    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            Error::ConnectorFailure { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Underlying;

    impl fmt::Display for Underlying {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("underlying cause")
        }
    }

    impl std::error::Error for Underlying {}

    #[test]
    fn test_failure_with_code_only() {
        let err = Error::connector_failure(ErrorCode::SqlError, None, None);
        assert_eq!(err.kind(), ErrorKind::ConnectorFailure);
        assert_eq!(err.code(), Some(ErrorCode::SqlError));
        assert!(err.failure_detail().is_none());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "SQL error");
    }

    #[test]
    fn test_failure_with_message() {
        let err = Error::connector_failure(
            ErrorCode::SqlError,
            Some("An SQL error occurred".to_string()),
            None,
        );
        assert_eq!(err.failure_detail(), Some("An SQL error occurred"));
        assert_eq!(err.to_string(), "An SQL error occurred");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_failure_keeps_cause() {
        let err = Error::connector("close failed", Underlying);
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "underlying cause");
        assert!(source.downcast_ref::<Underlying>().is_some());
    }

    #[test]
    fn test_failure_with_cause_and_no_message() {
        let err = Error::connector_failure(ErrorCode::SqlError, None, Some(Box::new(Underlying)));
        assert!(err.failure_detail().is_none());
        assert_eq!(err.to_string(), "SQL error");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::invalid_argument("x").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::illegal_state("x").kind(), ErrorKind::IllegalState);
        assert_eq!(
            Error::CollectionNotFound("c".into()).kind(),
            ErrorKind::CollectionNotFound
        );
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Config);
        assert!(Error::invalid_argument("x").code().is_none());
    }

    #[test]
    fn test_illegal_state_display_is_bare_message() {
        let err = Error::illegal_state("Connection must be set before building");
        assert_eq!(err.to_string(), "Connection must be set before building");
    }

    #[test]
    fn test_error_code_message() {
        assert_eq!(ErrorCode::SqlError.message(), "SQL error");
        assert_eq!(ErrorCode::SqlError.to_string(), "SQL error");
    }
}
