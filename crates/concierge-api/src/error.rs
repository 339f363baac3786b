//! Error types for concierge-api

use thiserror::Error;

/// Result type alias using concierge-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the concierge backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered 2xx but reported an `{"error": ...}` payload
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a status error from a code and response body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether the request never got a usable HTTP response
    /// (connection refused, timeout, DNS, ...)
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// HTTP status code, when the backend produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let e = Error::status(404, "Trip not found");
        assert_eq!(e.to_string(), "Backend returned 404: Trip not found");
        assert_eq!(e.status_code(), Some(404));
    }

    #[test]
    fn test_backend_error_has_no_status() {
        let e = Error::Backend("Database not configured".into());
        assert_eq!(e.status_code(), None);
        assert!(!e.is_transport());
    }

    #[test]
    fn test_json_error_is_not_transport() {
        let e: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(!e.is_transport());
        assert!(e.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_invalid_config_display() {
        let e = Error::InvalidConfig("empty base url".into());
        assert_eq!(e.to_string(), "Invalid configuration: empty base url");
    }
}
