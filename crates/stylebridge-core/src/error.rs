//! Error types for Stylebridge core operations.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level failures.
///
/// These represent total unavailability of an input (the design document or
/// a parsed stylesheet), as opposed to per-item ambiguities which are logged
/// and recovered from locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Fetching the design document failed.
    #[error("Failed to fetch design document '{key}': {message}")]
    Fetch { key: String, message: String },

    /// The producer of a pending value rejected it.
    #[error("Operation rejected: {0}")]
    Rejected(String),

    /// The producer was dropped before settling.
    #[error("Operation was cancelled before it settled")]
    Cancelled,
}

impl Error {
    /// Create a fetch error.
    pub fn fetch(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
