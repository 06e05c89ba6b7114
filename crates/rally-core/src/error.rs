//! Unified application error types for Rally.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The real-time engine reports
//! errors to clients using [`ErrorKind::wire_code`], the HTTP layer maps
//! the same kinds onto status codes.

use std::fmt;
use thiserror::Error;

/// Machine-readable sub-codes carried in [`AppError::reason`].
pub mod reason {
    /// Removing this facilitator would leave the session without one.
    pub const ONLY_FACILITATOR: &str = "ONLY_FACILITATOR";
    /// The requested phase transition moves backwards or leaves the plan.
    pub const ILLEGAL_PHASE: &str = "ILLEGAL_PHASE";
    /// The session has reached its terminal phase.
    pub const SESSION_COMPLETED: &str = "SESSION_COMPLETED";
    /// The event is not accepted in the current phase.
    pub const WRONG_PHASE: &str = "WRONG_PHASE";
    /// Voting is closed for the target plan.
    pub const VOTING_LOCKED: &str = "VOTING_LOCKED";
    /// The participant has used all of their votes.
    pub const VOTE_LIMIT_REACHED: &str = "VOTE_LIMIT_REACHED";
    /// The participant already holds a live connection to the session.
    pub const DUPLICATE_CONNECTION: &str = "DUPLICATE_CONNECTION";
    /// The event type is not registered for this session kind.
    pub const UNKNOWN_EVENT: &str = "UNKNOWN_EVENT";
    /// A join or facilitator code did not verify.
    pub const INVALID_CODE: &str = "INVALID_CODE";
    /// The participant left the session permanently.
    pub const ABANDONED: &str = "ABANDONED";
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// The caller could not be identified (missing or invalid token).
    Authentication,
    /// The caller does not have permission to perform the action.
    Authorization,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (facilitator floor, illegal phase, duplicate connection).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
}

impl ErrorKind {
    /// Error code reported to WebSocket clients.
    pub fn wire_code(&self) -> &'static str {
        match self {
            Self::Validation => "EINVALID",
            Self::Authentication | Self::Authorization => "EUNAUTHORIZED",
            Self::NotFound => "ENOTFOUND",
            Self::Conflict => "ECONFLICT",
            Self::Internal | Self::Serialization | Self::Configuration => "EINTERNAL",
        }
    }

    /// Whether the error detail may be shown to the caller.
    pub fn is_client_facing(&self) -> bool {
        self.wire_code() != "EINTERNAL"
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// The unified application error used throughout Rally.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional machine-readable sub-code, see [`reason`].
    pub reason: Option<String>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            reason: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            reason: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a machine-readable sub-code.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Shorthand for the facilitator floor violation.
    pub fn only_facilitator() -> Self {
        Self::conflict("A session must keep at least one facilitator")
            .with_reason(reason::ONLY_FACILITATOR)
    }

    /// Returns `true` when the sub-code matches.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.reason.as_deref() == Some(reason)
    }

    /// Message safe to show to a client; internal detail is withheld.
    pub fn public_message(&self) -> &str {
        if self.kind.is_client_facing() {
            &self.message
        } else {
            "internal error"
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            reason: self.reason.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid payload: {err}"), err)
    }
}
