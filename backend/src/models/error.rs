//! Error values returned by request handlers.
//!
//! [`AppError`] is the single error shape clients see. The code selects the
//! HTTP status; only the message and developer message reach the wire.

use std::error::Error as StdError;
use std::sync::Arc;

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with the current state of the resource.
    Conflict,
    /// An unexpected error occurred on the server.
    Internal,
}

impl ErrorCode {
    /// HTTP status written for errors carrying this code.
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire identifier, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }

    /// Message used when a caller supplies a blank one.
    fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => NOT_FOUND_MESSAGE,
            Self::Conflict => "conflict",
            Self::Internal => INTERNAL_MESSAGE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const NOT_FOUND_MESSAGE: &str = "not found";
pub(crate) const INTERNAL_MESSAGE: &str = "internal system error";

/// Well-known failures recognised by identity rather than by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Sentinel {
    /// The addressed resource does not exist.
    NotFound,
}

impl Sentinel {
    /// Canonical error value for this sentinel.
    ///
    /// # Examples
    /// ```
    /// use rest_api_service::models::{ErrorCode, Sentinel};
    ///
    /// let err = Sentinel::NotFound.to_error();
    /// assert_eq!(err.code(), ErrorCode::NotFound);
    /// assert_eq!(err.message(), "not found");
    /// ```
    pub fn to_error(self) -> AppError {
        match self {
            Self::NotFound => AppError::new(ErrorCode::NotFound, NOT_FOUND_MESSAGE, ""),
        }
    }
}

/// Handler error carrying a code, a client-safe message and developer detail.
///
/// ## Invariants
/// - `message` is never blank; constructors substitute the code's default.
/// - the cause is kept for logging and never serialised.
///
/// # Examples
/// ```
/// use rest_api_service::models::{AppError, ErrorCode};
///
/// let err = AppError::new(ErrorCode::InvalidRequest, "test123", "test213");
/// let body = serde_json::to_string(&err).expect("serialises");
/// assert_eq!(body, r#"{"message":"test123","developer_message":"test213"}"#);
/// ```
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppError {
    #[serde(skip)]
    code: ErrorCode,
    #[schema(example = "not found")]
    message: String,
    #[schema(example = "")]
    developer_message: String,
    #[serde(skip)]
    cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new error. A blank `message` is replaced by the code's
    /// default message.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        developer_message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            code.default_message().clone_into(&mut message);
        }
        Self {
            code,
            message,
            developer_message: developer_message.into(),
            cause: None,
        }
    }

    /// Attach the underlying failure.
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Replace the developer message.
    pub fn with_developer_message(mut self, developer_message: impl Into<String>) -> Self {
        self.developer_message = developer_message.into();
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Client-safe message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Diagnostic detail for developers.
    pub fn developer_message(&self) -> &str {
        self.developer_message.as_str()
    }

    /// HTTP status selected by the error code.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    /// Whether this error is the canonical instance of `sentinel`.
    pub fn is(&self, sentinel: Sentinel) -> bool {
        *self == sentinel.to_error()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, "")
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message, "")
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message, "")
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message, "")
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message, "")
    }

    /// Internal error wrapping `cause`. Its text becomes the developer
    /// message and the error itself stays reachable through
    /// [`StdError::source`].
    pub fn internal(cause: impl StdError + Send + Sync + 'static) -> Self {
        let developer_message = cause.to_string();
        Self::new(ErrorCode::Internal, INTERNAL_MESSAGE, developer_message).with_cause(cause)
    }
}

impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message == other.message
            && self.developer_message == other.developer_message
    }
}

impl Eq for AppError {}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}
