//! Error types for roster.
//!
//! This module defines all error types used throughout the roster crate,
//! providing detailed context for debugging and user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::record::RecordRef;
use crate::validate::FieldErrors;

/// The main error type for roster operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A candidate failed field validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The referenced record does not exist.
    #[error("record not found: {0}")]
    NotFound(RecordRef),

    /// An intent was sent to the controller in a state that does not accept it.
    #[error("cannot {intent} while in {state} mode")]
    InvalidTransition {
        /// The controller state at the time.
        state: &'static str,
        /// The rejected intent.
        intent: &'static str,
    },

    // === Remote Errors ===
    /// An HTTP request could not be completed.
    #[error("request to {operation} failed: {source}")]
    Http {
        /// Remote operation name (list, create, update, delete).
        operation: &'static str,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("server rejected {operation} with status {status}")]
    RemoteStatus {
        /// Remote operation name.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The server's response body could not be decoded.
    #[error("invalid response to {operation}: {message}")]
    RemoteDecode {
        /// Remote operation name.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A remote URL could not be built.
    #[error("invalid url '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roster operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a transport error for a remote operation.
    #[must_use]
    pub fn http(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Http { operation, source }
    }

    /// Create a decode error for a remote operation.
    #[must_use]
    pub fn remote_decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::RemoteDecode {
            operation,
            message: message.into(),
        }
    }

    /// Check if this error means the referenced record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a field validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from talking to the remote server.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::RemoteStatus { .. } | Self::RemoteDecode { .. }
        )
    }

    /// The field errors carried by a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
