//! Error types for consumer session operations

use thiserror::Error;

/// Consumer session error
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Network or transport failure talking to the REST proxy
    #[error("REST proxy unavailable: {0}")]
    RemoteUnavailable(String),

    /// Proxy answered with a non-success status
    #[error("Proxy error {status}: {message}")]
    Server { status: u16, message: String },

    /// No consumer session registered for the topic
    #[error("No active consumer session for topic: {0}")]
    NoActiveSession(String),

    /// Record value is malformed for its declared format
    #[error("Failed to decode {format} value: {reason}")]
    DecodeFailure { format: String, reason: String },

    /// Local session entry was cleared but the remote delete failed
    #[error("Session for {topic} revoked locally, remote delete failed: {source}")]
    RevokedLocally {
        topic: String,
        #[source]
        source: Box<ConsumerError>,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsumerError {
    /// Whether this error means the topic had no registered session
    pub fn is_no_active_session(&self) -> bool {
        matches!(self, ConsumerError::NoActiveSession(_))
    }
}

impl From<reqwest::Error> for ConsumerError {
    fn from(err: reqwest::Error) -> Self {
        ConsumerError::RemoteUnavailable(err.to_string())
    }
}

impl From<toml::de::Error> for ConsumerError {
    fn from(err: toml::de::Error) -> Self {
        ConsumerError::Config(err.to_string())
    }
}

/// Result type for consumer session operations
pub type Result<T> = std::result::Result<T, ConsumerError>;
