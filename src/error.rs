//! Error types for homework-bot
//!
//! This module provides the error taxonomy for the polling loop:
//! - Fatal configuration errors raised once at startup
//! - Cycle-recoverable errors (validation, upstream status, transport, decoding)
//! - Delivery errors that the notifier logs and swallows
//!
//! Every fallible operation in the crate returns [`Result`]. Nothing propagates
//! past the poll loop's cycle boundary except configuration errors.

use thiserror::Error;

/// Result type alias for homework-bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for homework-bot
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid or missing
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "TELEGRAM_TOKEN")
        key: Option<String>,
    },

    /// API payload does not match the documented shape
    #[error("invalid API response: {0}")]
    Validation(#[from] ValidationError),

    /// Upstream API answered with something other than 200 OK
    #[error("homework API returned HTTP {status}")]
    UpstreamStatus {
        /// The HTTP status code returned by the API
        status: u16,
    },

    /// Transport-level failure (timeout, DNS, connection refused)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Chat service rejected or failed to accept a message
    #[error("message delivery failed: {0}")]
    Delivery(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Shape violations detected while validating an API payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A value has the wrong JSON type
    #[error("`{field}` must be {expected}")]
    Shape {
        /// Path of the offending value (`$` for the top level)
        field: String,
        /// Description of the expected type (e.g., "an array")
        expected: &'static str,
    },

    /// A required key is absent
    #[error("missing required key `{field}`")]
    MissingField {
        /// The key that was not present
        field: String,
    },
}

impl ValidationError {
    /// Shorthand for a [`ValidationError::Shape`]
    pub fn shape(field: impl Into<String>, expected: &'static str) -> Self {
        Self::Shape {
            field: field.into(),
            expected,
        }
    }

    /// Shorthand for a [`ValidationError::MissingField`]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

impl Error {
    /// Build a configuration error tied to a specific environment variable
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Returns true if the failure is likely to clear up on its own
    ///
    /// Transport failures, rate limiting and 5xx responses are transient.
    /// Contract violations (shape, decoding, 4xx) need someone to look at them.
    /// A chat service refusing a message (blocked bot, unknown chat) is not
    /// transient. Callers only use this to annotate their logs; every cycle is
    /// retried after the same fixed period regardless.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::UpstreamStatus { status } => *status == 429 || (500..600).contains(status),
            Error::Config { .. }
            | Error::Validation(_)
            | Error::Delivery(_)
            | Error::Decode(_)
            | Error::Other(_) => false,
        }
    }

    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(ValidationError::Shape { .. }) => "shape_error",
            Error::Validation(ValidationError::MissingField { .. }) => "missing_field",
            Error::UpstreamStatus { .. } => "upstream_status",
            Error::Network(_) => "network_error",
            Error::Decode(_) => "decode_error",
            Error::Delivery(_) => "delivery_error",
            Error::Other(_) => "internal_error",
        }
    }
}
