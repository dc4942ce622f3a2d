//! Error types for the Mirror application.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Generic message shown when the backend could not be reached.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Connection to the mirror failed. Check your network and API key, then try again.";

/// Generic message shown when the backend answered with something unusable.
pub const REFLECTION_FAILED_MESSAGE: &str =
    "The mirror could not form a clear reflection. Please try again.";

/// Classification of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendErrorKind {
    /// Transport failure: DNS, connect, TLS, timeout.
    Network,
    /// The credential was rejected.
    Auth,
    /// Any other non-success answer.
    Unknown,
}

/// Classification of a backend answer that failed schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationErrorKind {
    /// The text was not JSON at all.
    MalformedJson,
    /// A required field was absent.
    MissingField,
    /// A field was present with the wrong type, length or emptiness.
    WrongShape,
}

/// A shared error type for the entire Mirror application.
///
/// Every failure that can reach a session is one of these variants, so the
/// orchestrator can classify it without downcasting.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MirrorError {
    /// Missing credential, invalid configuration value, empty catalog.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The language-model backend could not be reached or refused the call.
    #[error("Backend error ({kind}): {message}")]
    Backend {
        kind: BackendErrorKind,
        message: String,
    },

    /// The backend answered, but the answer does not match the result schema.
    ///
    /// `raw` keeps the offending text for diagnostics; it is never part of the
    /// user-facing message.
    #[error("Validation error ({kind}): {message}")]
    Validation {
        kind: ValidationErrorKind,
        message: String,
        raw: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MirrorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Backend error of the given kind
    pub fn backend(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self::Backend {
            kind,
            message: message.into(),
        }
    }

    /// Creates a network Backend error
    pub fn network(message: impl Into<String>) -> Self {
        Self::backend(BackendErrorKind::Network, message)
    }

    /// Creates a Validation error that retains the raw backend text
    pub fn validation(
        kind: ValidationErrorKind,
        message: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Returns the backend classification, if this is a backend error.
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match self {
            Self::Backend { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the validation classification, if this is a validation error.
    pub fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self {
            Self::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True when the backend text was not JSON.
    pub fn is_parse_error(&self) -> bool {
        self.validation_kind() == Some(ValidationErrorKind::MalformedJson)
    }

    /// True when the backend text was JSON of the wrong shape (missing or
    /// mistyped fields).
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self.validation_kind(),
            Some(ValidationErrorKind::MissingField | ValidationErrorKind::WrongShape)
        )
    }

    /// Returns the offending backend text kept for diagnostics.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Validation { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// The message to render for the user.
    ///
    /// Configuration problems are shown verbatim; backend and validation
    /// failures collapse to generic messages.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(message) => message.clone(),
            Self::Backend { .. } => CONNECTION_FAILED_MESSAGE.to_string(),
            Self::Validation { .. } => REFLECTION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// A type alias for `Result<T, MirrorError>`.
pub type Result<T> = std::result::Result<T, MirrorError>;
