//! Error types for the slidemark library.

use std::io;
use thiserror::Error;

/// Result type alias for slidemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or rendering slide markup.
///
/// Tag-level malformation is never reported here: broken attributes,
/// unknown tags and unbalanced structure are absorbed by the parser.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not valid UTF-8 text.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Error serializing slides.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during rendering.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Render("bad table".to_string());
        assert_eq!(err.to_string(), "Render error: bad table");

        let err = Error::MalformedInput("invalid utf-8".to_string());
        assert_eq!(err.to_string(), "Malformed input: invalid utf-8");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_utf8() {
        let bytes: Vec<u8> = vec![0x3c, 0xff, 0xfe];
        let utf8_err = std::str::from_utf8(&bytes).unwrap_err();
        let err: Error = utf8_err.into();
        assert!(matches!(err, Error::MalformedInput(_)));
    }
}
