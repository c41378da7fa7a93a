//! Unified error handling for tencentcloud-core
//!
//! Every failure that crosses the SDK boundary is an [`SdkError`] carrying the
//! machine-readable error code returned by the Tencent Cloud API. Transport
//! failures are folded into the same shape (`ClientError.*` codes), so retry
//! classification only ever has to look at a code.
//!
//! # Example
//!
//! ```rust
//! use tencentcloud_core::{CoreError, SdkError};
//!
//! let err: CoreError = SdkError::new("RequestLimitExceeded", "slow down", "req-1").into();
//! assert!(err.is_retryable());
//! assert!(err.is_rate_limited());
//!
//! let err: CoreError = SdkError::new("ResourceNotFound", "no such fs", "req-2").into();
//! assert!(err.is_not_found());
//! assert!(!err.is_retryable());
//! ```

use std::time::Duration;
use thiserror::Error;

/// Error codes that denote transient, server-side conditions.
///
/// Matching is by family: `InternalError` also matches `InternalError.DbError`.
pub const RETRYABLE_ERROR_CODES: &[&str] = &[
    // client side
    SdkError::NETWORK_ERROR,
    SdkError::HTTP_STATUS_CODE_ERROR,
    // common
    "InternalError",
    "FailedOperation",
    "TradeUnknownError",
    "RequestLimitExceeded",
    "ResourceInUse",
    "ResourceInsufficient",
    "ResourceUnavailable",
    "ResourceBusy",
];

/// An error returned by the Tencent Cloud API (or synthesized by the transport)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={request_id}")]
pub struct SdkError {
    /// Machine-readable error code, e.g. `InvalidParameter.InstanceNotFound`
    pub code: String,
    /// Human readable message
    pub message: String,
    /// Request id assigned by the API gateway (empty for client-side errors)
    pub request_id: String,
}

impl SdkError {
    pub const NETWORK_ERROR: &'static str = "ClientError.NetworkError";
    pub const HTTP_STATUS_CODE_ERROR: &'static str = "ClientError.HttpStatusCodeError";
    pub const PARSE_JSON_ERROR: &'static str = "ClientError.ParseJsonError";

    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// A client-side error that never reached the API
    pub fn client(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, message, "")
    }

    /// Returns true if the code equals one of `codes` or belongs to one of their families
    #[must_use]
    pub fn has_code(&self, codes: &[&str]) -> bool {
        codes.iter().any(|expected| code_matches(&self.code, expected))
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.has_code(RETRYABLE_ERROR_CODES)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code.starts_with("ResourceNotFound") || self.code.contains("NotFound")
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.has_code(&["AuthFailure", "UnauthorizedOperation"])
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.has_code(&["RequestLimitExceeded"])
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.has_code(&[
            "InvalidParameter",
            "InvalidParameterValue",
            "MissingParameter",
            "UnknownParameter",
            "InvalidAction",
        ])
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.has_code(&["InternalError"])
    }

    #[must_use]
    pub fn is_network_error(&self) -> bool {
        self.has_code(&[Self::NETWORK_ERROR, Self::HTTP_STATUS_CODE_ERROR])
    }
}

fn code_matches(code: &str, expected: &str) -> bool {
    code == expected
        || code
            .strip_prefix(expected)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the Tencent Cloud API or its transport
    #[error("Cloud API error: {0}")]
    Sdk(#[from] SdkError),

    /// An asynchronous operation reached its failure state
    #[error("Operation {handle} failed: {reason}")]
    TaskFailed { handle: String, reason: String },

    /// An asynchronous operation did not reach a terminal state in time
    #[error("Operation {handle} timed out after {timeout:?}")]
    TaskTimeout { handle: String, timeout: Duration },

    /// An asynchronous operation reported a status outside the known set
    #[error("Operation {handle} reported illegal status `{status}`")]
    IllegalStatus { handle: String, status: String },

    /// The retry budget was spent while the operation kept failing transiently
    #[error("Retry budget of {budget:?} exhausted, last error: {last}")]
    RetryExhausted {
        budget: Duration,
        #[source]
        last: Box<CoreError>,
    },

    /// A resource that must exist could not be found
    #[error("Resource `{kind}` {id} does not exist")]
    NotFound { kind: String, id: String },

    /// A planned change touches an argument that cannot be updated in place
    #[error("argument `{0}` cannot be changed")]
    ImmutableField(String),

    /// Invalid input detected before any API call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API answered, but not with what the call requires
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Local file I/O failed
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization of local data failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An error annotated with the identifiers it happened on
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CoreError>,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Wrap this error with contextual identifiers such as an instance id
    pub fn context(self, context: impl Into<String>) -> Self {
        CoreError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through [`CoreError::Context`] wrappers
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The SDK error behind this error, if any
    pub fn sdk_error(&self) -> Option<&SdkError> {
        match self.root() {
            CoreError::Sdk(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self.root() {
            CoreError::Sdk(e) => e.is_not_found(),
            CoreError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.sdk_error().is_some_and(SdkError::is_unauthorized)
    }

    /// Returns true if this is a server-side internal error
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.sdk_error().is_some_and(SdkError::is_server_error)
    }

    /// Returns true if this is a timeout of the poller or of a retry budget
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.root(),
            CoreError::TaskTimeout { .. } | CoreError::RetryExhausted { .. }
        )
    }

    /// Returns true if this is a rate limiting error
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.sdk_error().is_some_and(SdkError::is_rate_limited)
    }

    /// Returns true if this is a bad request / validation error
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self.root() {
            CoreError::Sdk(e) => e.is_bad_request(),
            CoreError::Validation(_) | CoreError::ImmutableField(_) => true,
            _ => false,
        }
    }

    /// Returns true if the SDK error code matches one of `codes`
    #[must_use]
    pub fn has_code(&self, codes: &[&str]) -> bool {
        self.sdk_error().is_some_and(|e| e.has_code(codes))
    }

    /// Returns true if this error is transient and the call may be repeated
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.sdk_error().is_some_and(SdkError::is_retryable)
    }
}

/// Attach context to the error side of a [`Result`]
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_matching() {
        let err = SdkError::new("InternalError.DbError", "db down", "r");
        assert!(err.is_retryable());
        assert!(err.is_server_error());

        // A shared prefix that is not a family member does not match
        let err = SdkError::new("InternalErrorX", "", "r");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_retryable() {
        let err = SdkError::client(SdkError::NETWORK_ERROR, "connection reset");
        assert!(err.is_retryable());
        assert!(err.is_network_error());
        assert!(err.request_id.is_empty());

        let err = SdkError::client(SdkError::PARSE_JSON_ERROR, "bad body");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_variants() {
        for code in [
            "ResourceNotFound",
            "ResourceNotFound.InstanceNotExists",
            "InvalidParameter.InstanceNotFound",
        ] {
            let err: CoreError = SdkError::new(code, "", "r").into();
            assert!(err.is_not_found(), "{code} should be not-found");
            assert!(!err.is_retryable(), "{code} should not be retryable");
        }
    }

    #[test]
    fn test_validation_and_permission_are_fatal() {
        let err: CoreError = SdkError::new("InvalidParameterValue.Zone", "", "r").into();
        assert!(err.is_bad_request());
        assert!(!err.is_retryable());

        let err: CoreError = SdkError::new("AuthFailure.SignatureFailure", "", "r").into();
        assert!(err.is_unauthorized());
        assert!(!err.is_retryable());

        let err = CoreError::Validation("bad zone".to_string());
        assert!(err.is_bad_request());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_context_is_transparent_for_classification() {
        let err: CoreError = SdkError::new("ResourceBusy", "", "r").into();
        let err = err.context("instance mssql-123");
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("instance mssql-123: "));
        assert_eq!(err.sdk_error().map(|e| e.code.as_str()), Some("ResourceBusy"));
    }

    #[test]
    fn test_exhausted_retry_is_final() {
        let last: CoreError = SdkError::new("InternalError", "", "r").into();
        let err = CoreError::RetryExhausted {
            budget: Duration::from_secs(1),
            last: Box::new(last),
        };
        assert!(err.is_timeout());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("InternalError"));
    }

    #[test]
    fn test_extra_codes() {
        let err: CoreError = SdkError::new("OperationDenied.InstanceStatusLimitError", "", "r").into();
        assert!(!err.is_retryable());
        assert!(err.has_code(&["OperationDenied"]));
        assert!(err.has_code(&["OperationDenied.InstanceStatusLimitError"]));
        assert!(!err.has_code(&["OperationDenied.Other"]));
    }

    #[test]
    fn test_display() {
        let err: CoreError = SdkError::new("ResourceNotFound", "gone", "req-9").into();
        let msg = err.to_string();
        assert!(msg.contains("Cloud API error"));
        assert!(msg.contains("Code=ResourceNotFound"));
        assert!(msg.contains("RequestId=req-9"));

        let err = CoreError::ImmutableField("zone".to_string());
        assert_eq!(err.to_string(), "argument `zone` cannot be changed");
    }
}
