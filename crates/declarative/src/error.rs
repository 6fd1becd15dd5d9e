//! Error types for reconciliation.
//!
//! Every error aborts the current invocation. Errors are grouped into
//! categories so front ends can give appropriate feedback; the engine never
//! retries anything on its own.

use serde_json::Value;
use std::fmt;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the remote store (or the transport in front of it).
///
/// Status, reason and body are surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code, `None` when the request never got a response.
    pub status: Option<u16>,
    /// Reason phrase or transport error message.
    pub reason: String,
    /// Raw response body.
    pub body: String,
}

impl ApiError {
    /// Create an error for a response with a status code.
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Create an error for a request that failed before a response arrived.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: reason.into(),
            body: String::new(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} {} {}", status, self.reason, self.body),
            None => write!(f, "{} {}", self.reason, self.body),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors returned by a [`ResourceClient`](crate::ResourceClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No object exists under the identifier.
    #[error("object not found: {id}")]
    NotFound {
        /// Identifier that was requested.
        id: String,
    },

    /// Any other remote failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Categories of engine errors, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An identifier the caller asserted does not exist.
    NotFound,
    /// The remote store holds conflicting data (several natural-key matches).
    Conflict,
    /// The desired state breaks a rule of the resource type.
    Validation,
    /// The remote store or transport failed.
    Remote,
    /// The caller's input was rejected before any network activity.
    Input,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Object not found",
            Self::Conflict => "Ambiguous remote state",
            Self::Validation => "Validation failed",
            Self::Remote => "Remote API error",
            Self::Input => "Invalid input",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Check the id, or use the absent state if the object may already be gone",
            Self::Conflict => "Supply the object's id to pick one match explicitly",
            Self::Validation => "Recreate the object to change fields that are fixed after creation",
            Self::Remote => "Check credentials, endpoint and the response body for details",
            Self::Input => "Fix the task definition and run again",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that abort a reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup by identifier found nothing while the object was expected to exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind.
        kind: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// Natural-key lookup returned more than one object.
    #[error("found multiple {kind} matching {filter} ({count} results)")]
    AmbiguousMatch {
        /// Resource kind.
        kind: String,
        /// Filter expression used for the lookup.
        filter: String,
        /// Number of matches.
        count: usize,
    },

    /// A field fixed at creation differs between desired and existing state.
    #[error("{field} cannot be updated")]
    ReadonlyViolation {
        /// Resource kind.
        kind: String,
        /// Offending field.
        field: String,
        /// Value currently held by the remote store.
        existing: Value,
        /// Value the caller asked for.
        desired: Value,
    },

    /// The remote store or transport failed.
    #[error("failed to execute command: {0}")]
    RemoteApi(ApiError),

    /// The caller's selector is missing or contradictory.
    #[error("invalid selector: {0}")]
    Selector(String),

    /// Malformed input rejected before any network activity.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote store returned an object without an identifier.
    #[error("{kind} returned without an `{field}` field")]
    MissingIdentifier {
        /// Resource kind.
        kind: String,
        /// Identifier field that was expected.
        field: String,
    },
}

impl Error {
    /// Convert a client error, attaching the resource kind.
    pub fn client(kind: &str, err: ClientError) -> Self {
        match err {
            ClientError::NotFound { id } => Self::NotFound {
                kind: kind.to_string(),
                id,
            },
            ClientError::Api(api) => Self::RemoteApi(api),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AmbiguousMatch { .. } => ErrorCategory::Conflict,
            Error::ReadonlyViolation { .. } => ErrorCategory::Validation,
            Error::RemoteApi(_) | Error::MissingIdentifier { .. } => ErrorCategory::Remote,
            Error::Selector(_) | Error::InvalidInput(_) => ErrorCategory::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_status() {
        let err = ApiError::new(400, "Bad Request", r#"{"error":"invalid fqdn"}"#);
        assert_eq!(err.to_string(), r#"400 Bad Request {"error":"invalid fqdn"}"#);
    }

    #[test]
    fn test_api_error_display_transport() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.status, None);
        assert!(err.to_string().starts_with("connection refused"));
    }

    #[test]
    fn test_client_not_found_keeps_kind() {
        let err = Error::client(
            "AuthZone",
            ClientError::NotFound {
                id: "dns/auth_zone/1".to_string(),
            },
        );
        assert_eq!(err.to_string(), "AuthZone not found: dns/auth_zone/1");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_client_api_error_is_remote() {
        let err = Error::client("View", ApiError::new(500, "Internal Server Error", "").into());
        assert!(matches!(err, Error::RemoteApi(ref api) if api.status == Some(500)));
        assert_eq!(err.category(), ErrorCategory::Remote);
    }

    #[test]
    fn test_readonly_message_names_field() {
        let err = Error::ReadonlyViolation {
            kind: "AuthZone".to_string(),
            field: "fqdn".to_string(),
            existing: Value::from("a.com"),
            desired: Value::from("b.com"),
        };
        assert_eq!(err.to_string(), "fqdn cannot be updated");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_category_advice_not_empty() {
        for category in [
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Validation,
            ErrorCategory::Remote,
            ErrorCategory::Input,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.advice().is_empty());
        }
    }
}
