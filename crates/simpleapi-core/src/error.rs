//! Error types for simpleapi-core

use crate::bind::Location;
use crate::response::StatusCode;
use thiserror::Error;

/// Result type alias for simpleapi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the simpleapi toolkit
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// A request value could not be bound to a handler argument
    #[error("Invalid {location} parameter `{name}`: {message}")]
    Bind {
        location: Location,
        name: String,
        message: String,
    },

    /// Route registered without any handler
    #[error("No handlers given for {method} {path}")]
    EmptyChain { method: String, path: String },

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error (native only)
    #[cfg(feature = "native")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Status code a dispatcher should answer with
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Bind { .. } | Error::InvalidMethod(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_message() {
        let err = Error::Bind {
            location: Location::Query,
            name: "page".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid query parameter `page`: invalid digit found in string"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_status() {
        let err = Error::Internal("boom".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
