//! Error types for html2nodes operations.

use thiserror::Error;

/// Errors that can abort a parse.
///
/// The transformation engine itself never fails: every DOM shape produces
/// some (possibly empty) forest. Failures come from the layers around it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Markup rejected by tokenizer: {0}")]
    Markup(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn read_missing() -> Result<Vec<u8>> {
        Ok(std::fs::read("/nonexistent/html2nodes/input.html")?)
    }

    #[test]
    fn test_io_error_converts() {
        let err = read_missing().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_json_error_maps_to_io() {
        let json = serde_json::from_str::<u8>("x").unwrap_err();
        let err: Error = std::io::Error::from(json).into();
        assert!(matches!(err, Error::Io(_)));
    }
}
