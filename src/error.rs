//! Error type shared by every client operation.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the client and its storage backends.
///
/// Nothing in the library terminates the process; the caller decides how to
/// escalate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StowageError {
    /// The credential payload could not be parsed or lacks a required field.
    #[error("Invalid credential: {message}")]
    Credential { message: String },

    /// The storage backend could not be constructed.
    #[error("Failed to connect to storage: {message}")]
    Connection { message: String },

    /// The administrative email has no `@domain` part.
    #[error("Invalid admin email '{email}': expected 'user@domain'")]
    InvalidEmail { email: String },

    /// A bucket or object name was empty or could not be derived.
    #[error("Invalid name: {message}")]
    InvalidName { message: String },

    /// A zero timeout would expire before any transfer could start.
    #[error("Invalid timeout {timeout:?}: must be greater than zero")]
    InvalidTimeout { timeout: Duration },

    /// The operation did not finish within its bound.
    #[error("{operation} of {bucket}/{key} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        bucket: String,
        key: String,
        timeout: Duration,
    },

    /// The remote object (or its bucket) does not exist.
    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Any other remote read or write failure.
    #[error("Transfer of {bucket}/{key} failed: {message}")]
    Transfer {
        bucket: String,
        key: String,
        message: String,
    },

    /// Local filesystem failure.
    #[error("I/O error for {path}: {message}")]
    LocalIo { path: String, message: String },
}

impl StowageError {
    pub(crate) fn local_io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        StowageError::LocalIo {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Short machine-readable code, used for JSON error events.
    pub fn code(&self) -> &'static str {
        match self {
            StowageError::Credential { .. } => "credential_error",
            StowageError::Connection { .. } => "connection_error",
            StowageError::InvalidEmail { .. } => "invalid_email",
            StowageError::InvalidName { .. } => "invalid_name",
            StowageError::InvalidTimeout { .. } => "invalid_timeout",
            StowageError::Timeout { .. } => "timeout",
            StowageError::ObjectNotFound { .. } => "object_not_found",
            StowageError::Transfer { .. } => "transfer_error",
            StowageError::LocalIo { .. } => "local_io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, StowageError>;
