//! Custom error types for connect-backup
//!
//! This module defines the error hierarchy for backup and restore runs using
//! thiserror for ergonomic error definitions. The variants follow the failure
//! policy of the tool: listing and describe failures are scoped to one
//! resource kind or item, write failures are aggregated per stage, and read,
//! deserialize and validation failures end a single restore.

use thiserror::Error;

use crate::models::ResourceKind;

/// The main error type for connect-backup operations
#[derive(Error, Debug)]
pub enum ConnectBackupError {
    /// Listing a resource kind failed; enumeration of that kind stops
    #[error("Failed to list {kind}: {message}")]
    List { kind: ResourceKind, message: String },

    /// Fetching the detail of a single item failed
    #[error("Failed to describe {kind} '{identifier}': {message}")]
    Describe {
        kind: ResourceKind,
        identifier: String,
        message: String,
    },

    /// Persisting a record to the destination failed
    #[error("Write error: {0}")]
    Write(String),

    /// Reading a restore source failed
    #[error("Read error: {0}")]
    Read(String),

    /// A restore source could not be decoded into the requested kind
    #[error("Failed to deserialize {kind}: {message}")]
    Deserialize { kind: ResourceKind, message: String },

    /// Cross-environment or request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record kind has no mapping for the requested operation
    #[error("Unsupported resource type: {0}")]
    UnsupportedType(String),

    /// A remote provider call failed
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// The run was interrupted between resource kinds or pages
    #[error("Operation cancelled")]
    Cancelled,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// One or more backup stages failed
    #[error("Backup finished with {}", format_stages(.failures))]
    StagesFailed { failures: Vec<String> },

    /// One or more independent update aspects failed
    #[error("{resource}: {}", format_aspects(.failures))]
    AspectsFailed {
        resource: String,
        failures: Vec<AspectFailure>,
    },
}

/// A failed update aspect of an in-place restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectFailure {
    /// Aspect name, e.g. `phone-config`
    pub aspect: String,
    /// Rendered provider error
    pub message: String,
}

fn format_stages(failures: &[String]) -> String {
    format!("{} failed stage(s): {}", failures.len(), failures.join("; "))
}

fn format_aspects(failures: &[AspectFailure]) -> String {
    let rendered = failures
        .iter()
        .map(|f| format!("{} ({})", f.aspect, f.message))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} aspect(s) failed: {}", failures.len(), rendered)
}

fn format_code(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

/// Class of a provider failure, decided from the typed service error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The addressed resource does not exist
    NotFound,
    /// The resource or association already exists
    Conflict,
    /// Request rate or quota exceeded
    Throttled,
    /// The credentials lack permission
    AccessDenied,
    /// The service rejected the request document
    InvalidRequest,
    /// The request never got a response (connection, timeout, credentials)
    Transport,
    /// The response could not be turned into a document
    Response,
    /// Any other service-side failure
    Service,
}

/// Error returned by the remote resource provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed{}: {message}", format_code(.code))]
pub struct ProviderError {
    /// Provider operation name, e.g. `describe-contact-flow`
    pub operation: String,
    pub kind: ProviderErrorKind,
    /// Service error code when one was reported
    pub code: Option<String>,
    /// Human readable message
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            kind: ProviderErrorKind::Service,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_kind(mut self, kind: ProviderErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Check whether the provider reported that the target already exists
    /// in the requested state (an association that is already present).
    pub fn is_conflict(&self) -> bool {
        self.kind == ProviderErrorKind::Conflict
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ProviderErrorKind::NotFound
    }
}

impl ConnectBackupError {
    /// Create a "not found" error for flows
    pub fn flow_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Flow",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the run was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ConnectBackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectBackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for connect-backup operations
pub type BackupResult<T> = Result<T, ConnectBackupError>;
