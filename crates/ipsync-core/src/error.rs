//! Error types for the sync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the sync system
#[derive(Error, Debug)]
pub enum Error {
    /// Address observation errors (interface enumeration failed)
    #[error("address observation error: {0}")]
    Observe(String),

    /// State store errors
    #[error("state store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors (from provider API calls)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the provider API
    #[error("provider API error (code {code}): {message}")]
    Api {
        /// Provider-assigned error code
        code: i64,
        /// Error message from the response envelope
        message: String,
    },

    /// The provider reported success but returned no usable record
    #[error("provider returned success but no record for {0}")]
    EmptyResult(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an address observation error
    pub fn observe(msg: impl Into<String>) -> Self {
        Self::Observe(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider API error from an envelope code/message pair
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }
}
