//! Error types for the stylesheet side.

/// Result type alias for stylesheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a stylesheet.
///
/// Only failures that leave no usable tree are errors. Malformed
/// declarations inside an otherwise balanced stylesheet are skipped and
/// logged instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The stylesheet text could not be parsed at all.
    #[error("Stylesheet parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        /// 1-indexed line.
        line: u32,
        /// 1-indexed column.
        column: u32,
    },
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }
}

impl From<Error> for stylebridge_core::Error {
    fn from(error: Error) -> Self {
        stylebridge_core::Error::rejected(error.to_string())
    }
}
