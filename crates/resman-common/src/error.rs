//! Error types for Resman
//!
//! Provides a unified error type. The aggregation paths are fail-soft and
//! only surface these errors from per-row parsing and host I/O.

use thiserror::Error;

/// Result type alias using ResmanError
pub type Result<T> = std::result::Result<T, ResmanError>;

/// Unified error type for Resman operations
#[derive(Debug, Error)]
pub enum ResmanError {
    // Access log errors
    #[error("Invalid timestamp {raw:?}: {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error("Invalid time bucket index {0}: expected 0..6")]
    InvalidBucket(u8),

    #[error("Invalid access event: {0}")]
    InvalidEvent(String),

    // Membership errors
    #[error("Invalid membership payload for owner {owner_id}: {reason}")]
    InvalidMembership { owner_id: String, reason: String },

    // Host counter errors
    #[error("Host counter error: {0}")]
    HostCounters(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ResmanError {
    fn from(err: serde_json::Error) -> Self {
        ResmanError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ResmanError {
    fn from(err: std::io::Error) -> Self {
        ResmanError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for ResmanError {
    fn from(err: anyhow::Error) -> Self {
        ResmanError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for ResmanError {
    fn from(err: config::ConfigError) -> Self {
        ResmanError::Config(err.to_string())
    }
}
