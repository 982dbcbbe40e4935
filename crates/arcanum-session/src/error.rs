//! Error types for the session's external collaborators.
//!
//! Nothing here is fatal to a session: store failures degrade to an
//! anonymous reading and narrator failures end the reading early.

use thiserror::Error;

/// Result type for profile-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for narrator operations.
pub type NarratorResult<T> = Result<T, NarratorError>;

/// Errors from a profile/history store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("store data error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store did not answer in time.
    #[error("store timed out")]
    Timeout,

    /// A user id that cannot be used as a storage key.
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    /// The backend is not reachable or not configured.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from a narrator while generating a reading.
#[derive(Debug, Error)]
pub enum NarratorError {
    /// No credentials were configured for the backing service.
    #[error("API key is missing")]
    MissingApiKey,

    /// The request could not be sent or the connection dropped.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The response stream could not be decoded.
    #[error("malformed stream: {0}")]
    Stream(String),

    /// The narrator produced no text at all.
    #[error("no text in response")]
    Empty,
}
