//! Console-level error type.
//!
//! Views return this error to the inbound adapter regardless of which port
//! failed underneath. Port errors convert into it so the command line can
//! report one shape and choose an exit status from [`ErrorCode`].

use std::fmt;

use serde_json::Value;

use super::ports::{DownloadSinkError, PortalApiError, SessionStoreError};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Input is malformed or the portal rejected the request.
    InvalidRequest,
    /// Credentials were refused or no session exists.
    Unauthorized,
    /// The requested payer or certificate does not exist.
    NotFound,
    /// The portal could not be reached in time.
    Unavailable,
    /// An unexpected error occurred inside the console.
    InternalError,
}

impl ErrorCode {
    /// Snake-case identifier used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Console error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use portal_console::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("missing payer");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "missing payer");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by [`Error::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

const FALLBACK_MESSAGE: &str = "unexpected error";

impl Error {
    /// Create a new error, substituting a generic message for a blank one.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: FALLBACK_MESSAGE.to_owned(),
            details: None,
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message shown to the operator.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use portal_console::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<PortalApiError> for Error {
    fn from(value: PortalApiError) -> Self {
        let message = value.to_string();
        match value {
            PortalApiError::Transport { .. } | PortalApiError::Timeout { .. } => {
                Self::unavailable(message)
            }
            PortalApiError::Status { status: 401, .. } => Self::unauthorized(message),
            PortalApiError::Status { status: 404, .. } => Self::not_found(message),
            PortalApiError::Status { .. } => Self::unavailable(message),
            PortalApiError::Rejected { status, .. } => {
                Self::invalid_request(message).with_details(serde_json::json!({ "status": status }))
            }
            PortalApiError::Decode { .. } => Self::internal(message),
        }
    }
}

impl From<SessionStoreError> for Error {
    fn from(value: SessionStoreError) -> Self {
        Self::internal(value.to_string())
    }
}

impl From<DownloadSinkError> for Error {
    fn from(value: DownloadSinkError) -> Self {
        Self::internal(value.to_string())
    }
}
