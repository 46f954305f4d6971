//! Error types for the design side.

/// Result type alias for design operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading design documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The design service payload could not be decoded.
    #[error("Failed to decode design document: {0}")]
    Decode(#[from] serde_json::Error),
}
