//! Error types for DDI transport operations.
//!
//! Errors are categorized so front ends can give appropriate feedback. No
//! category is retried automatically.

use declarative::{ApiError, ClientError};
use std::fmt;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never got a response.
    Network,
    /// The API key was rejected.
    Auth,
    /// The requested object does not exist.
    NotFound,
    /// The service rejected the request (4xx).
    Client,
    /// The service failed (5xx).
    Server,
    /// The response could not be decoded.
    Format,
    /// Endpoint or credentials are not configured.
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Object not found",
            Self::Client => "Request rejected",
            Self::Server => "Service error",
            Self::Format => "Invalid response format",
            Self::Config => "Configuration problem",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the CSP URL and your network connection",
            Self::Auth => "Check that the API key is valid and has access to this resource",
            Self::NotFound => "Verify the identifier is correct",
            Self::Client => "Check the request fields against the response body",
            Self::Server => "The service may be degraded, try again later",
            Self::Format => "The endpoint may not be a DDI API, check the CSP URL",
            Self::Config => "Set the CSP URL and API key in config.toml, the environment or flags",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during transport operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(ApiError),

    /// Response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// No API key configured.
    #[error("missing API key")]
    MissingCredentials,

    /// Base URL is not an http(s) URL.
    #[error("invalid CSP URL `{0}`: expected http:// or https://")]
    InvalidUrl(String),

    /// Caller input rejected before any request.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Status code of the failed request, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(api) => api.status,
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http(api) => match api.status {
                None => ErrorCategory::Network,
                Some(401 | 403) => ErrorCategory::Auth,
                Some(404) => ErrorCategory::NotFound,
                Some(500..) => ErrorCategory::Server,
                Some(_) => ErrorCategory::Client,
            },
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::MissingCredentials | Error::InvalidUrl(_) => ErrorCategory::Config,
            Error::InvalidInput(_) => ErrorCategory::Client,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http(ApiError::new(
                code,
                ureq::http::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|status| status.canonical_reason())
                    .unwrap_or("Unknown"),
                "",
            )),
            other => Self::Http(ApiError::transport(other.to_string())),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for ClientError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(api) => ClientError::Api(api),
            other => ClientError::Api(ApiError::transport(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_category_by_status() {
        let cases = [
            (None, ErrorCategory::Network),
            (Some(401), ErrorCategory::Auth),
            (Some(403), ErrorCategory::Auth),
            (Some(404), ErrorCategory::NotFound),
            (Some(409), ErrorCategory::Client),
            (Some(503), ErrorCategory::Server),
        ];
        for (status, category) in cases {
            let api = ApiError {
                status,
                reason: String::new(),
                body: String::new(),
            };
            assert_eq!(Error::Http(api).category(), category);
        }
    }

    #[test]
    fn test_config_category() {
        assert_eq!(Error::MissingCredentials.category(), ErrorCategory::Config);
        assert_eq!(
            Error::InvalidUrl("ftp://x".to_string()).category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_error_category_advice() {
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(!ErrorCategory::Auth.advice().is_empty());
        assert!(!ErrorCategory::Config.advice().is_empty());
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Auth);
        assert!(display.contains("Authentication"));
    }

    #[test]
    fn test_into_client_error_keeps_status() {
        let err = Error::Http(ApiError::new(400, "Bad Request", "bad cidr"));
        assert_eq!(err.status(), Some(400));
        let client: ClientError = err.into();
        assert_eq!(
            client,
            ClientError::Api(ApiError::new(400, "Bad Request", "bad cidr"))
        );
    }

    #[test]
    fn test_decode_error_is_format() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}
