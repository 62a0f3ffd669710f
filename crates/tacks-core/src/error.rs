//! Error types for tacks-core

use std::time::Duration;

use thiserror::Error;

/// Result type alias using tacks-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tacks-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("API error: {message} ({status})")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A fetch exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record or conflict not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation requires an authenticated session
    #[error("No authenticated session")]
    SessionRequired,
}
