//! Portal error types

use thiserror::Error;

/// Errors raised while talking to the insurance portal backend
#[derive(Error, Debug)]
pub enum PortalError {
    /// Client could not be configured
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("API request failed: {status} - {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body reports a failure
    #[error("Portal rejected the request: {message}")]
    Rejected { message: String },

    /// Body did not match the expected record shape
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Portal result type
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        PortalError::Config {
            message: message.into(),
        }
    }

    /// Create an API status error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        PortalError::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an embedded rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        PortalError::Rejected {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = PortalError::api(404, "survey not found");
        assert_eq!(err.to_string(), "API request failed: 404 - survey not found");
    }

    #[test]
    fn test_rejected_display() {
        let err = PortalError::rejected("Survey locked");
        assert_eq!(err.to_string(), "Portal rejected the request: Survey locked");
    }

    #[test]
    fn test_decode_from_serde() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: PortalError = serde_err.into();
        assert!(err.to_string().starts_with("Unexpected response shape"));
    }
}
