//! Error types for the Stylebridge facade.

use std::io;
use std::path::PathBuf;

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by sessions, configuration and link persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pending design fetch or deferred parse failed.
    #[error(transparent)]
    Core(#[from] stylebridge_core::Error),

    /// The design document could not be decoded.
    #[error(transparent)]
    Design(#[from] stylebridge_design::Error),

    /// The stylesheet could not be parsed.
    #[error(transparent)]
    Style(#[from] stylebridge_style::Error),

    /// Reading or writing a file failed.
    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The link file is not valid JSON.
    #[error("Invalid link file: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
