//! Error types for template operations.
//!
//! This module provides [`Error`], the single error type returned by every
//! public operation on a [`Template`](crate::Template). No operation
//! produces a partially rendered string: any failure aborts the call and
//! surfaces one of these variants.
//!
//! Unregistered masks are deliberately *not* an error. A placeholder that
//! names an unknown mask renders the value unchanged.

use thiserror::Error;

/// Error type for template operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Address resolution failed and creation was not permitted.
    #[error("block not found at address \"{0}\"")]
    AddressNotFound(String),

    /// An address segment is not a valid block name.
    #[error("invalid block address \"{address}\": {reason}")]
    InvalidAddress {
        /// The address as given by the caller
        address: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Data bound to a block is not a record or a record set.
    #[error("invalid data shape: {0}")]
    InvalidDataShape(String),

    /// A mask or processor cannot be invoked from markup.
    #[error("invalid callback \"{name}\": {reason}")]
    InvalidCallback {
        /// The name the callback was registered under
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The loader could not obtain template text.
    #[error("template source \"{name}\" unreadable: {source}")]
    SourceUnreadable {
        /// Loader-specific name of the source (usually a path)
        name: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A renderable view failed while rendering itself.
    #[error("view render failed: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidDataShape(err.to_string())
    }
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::AddressNotFound("Main:Row".to_string());
        assert!(err.to_string().contains("block not found"));
        assert!(err.to_string().contains("Main:Row"));
    }

    #[test]
    fn test_source_unreadable_keeps_io_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::SourceUnreadable {
            name: "page.html".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("page.html"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidDataShape(_)));
    }
}
