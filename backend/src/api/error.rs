//! Classification of handler errors into HTTP statuses and error bodies.
//!
//! Error sources opt in through [`Classify`], reporting a tagged
//! [`Classification`]. Anything that reports [`Classification::Unrecognized`]
//! becomes a 500 whose developer message carries the original text.

use std::error::Error as StdError;

use actix_web::http::StatusCode;

use crate::models::error::INTERNAL_MESSAGE;
use crate::models::{AppError, ErrorCode, Sentinel};
use crate::storage::StorageError;

/// How an error source describes itself to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The error already carries its full classification.
    Explicit(AppError),
    /// The error is a well-known failure.
    Sentinel(Sentinel),
    /// Nothing is known beyond the error's text.
    Unrecognized,
}

/// Capability implemented by errors that handlers may return.
pub trait Classify: std::fmt::Display {
    /// Describe this error for the classifier.
    fn classification(&self) -> Classification {
        Classification::Unrecognized
    }
}

/// Resolved status and body for a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Status written to the response.
    pub status: StatusCode,
    /// Error serialised into the response body.
    pub error: AppError,
}

impl ClassifiedError {
    fn from_app_error(error: AppError) -> Self {
        Self {
            status: error.status(),
            error,
        }
    }
}

/// Classify `error` into a status and body.
///
/// Total and pure: every input yields a well-formed classification and the
/// same input always yields the same output.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use rest_api_service::api::error::classify;
///
/// let err: Box<dyn std::error::Error + Send + Sync> = "boom".into();
/// let classified = classify(&err);
/// assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
/// assert_eq!(classified.error.developer_message(), "boom");
/// ```
pub fn classify<E>(error: &E) -> ClassifiedError
where
    E: Classify + ?Sized,
{
    let app_error = match error.classification() {
        Classification::Explicit(app_error) => app_error,
        Classification::Sentinel(sentinel) => sentinel.to_error(),
        Classification::Unrecognized => {
            AppError::new(ErrorCode::Internal, INTERNAL_MESSAGE, error.to_string())
        }
    };
    ClassifiedError::from_app_error(app_error)
}

/// Classify an optional error. `None` means the handler succeeded and there is
/// nothing to write.
pub fn classify_optional<E>(error: Option<&E>) -> Option<ClassifiedError>
where
    E: Classify + ?Sized,
{
    error.map(classify)
}

impl Classify for AppError {
    fn classification(&self) -> Classification {
        Classification::Explicit(self.clone())
    }
}

impl Classify for StorageError {
    fn classification(&self) -> Classification {
        match self {
            Self::NotFound { .. } => Classification::Sentinel(Sentinel::NotFound),
            Self::InvalidId { .. } => Classification::Explicit(
                AppError::new(ErrorCode::InvalidRequest, "invalid user id", self.to_string())
                    .with_cause(self.clone()),
            ),
            Self::Connection { .. } | Self::Query { .. } => Classification::Unrecognized,
        }
    }
}

/// Classification of a type-erased error.
///
/// Walks `error` and its [`StdError::source`] chain and returns the first
/// classification reported by a known error type, so a not-found storage
/// error keeps its 404 when another error wraps it. Chains without a known
/// error are unrecognised.
///
/// # Examples
/// ```
/// use rest_api_service::api::error::{Classification, classification_of};
/// use rest_api_service::models::Sentinel;
/// use rest_api_service::storage::StorageError;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("loading user: {0}")]
/// struct Loading(#[source] StorageError);
///
/// let err = Loading(StorageError::not_found("42"));
/// assert_eq!(
///     classification_of(&err),
///     Classification::Sentinel(Sentinel::NotFound)
/// );
/// ```
pub fn classification_of(error: &(dyn StdError + 'static)) -> Classification {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(known) = known_classification(error) {
            return known;
        }
        current = error.source();
    }
    Classification::Unrecognized
}

fn known_classification(error: &(dyn StdError + 'static)) -> Option<Classification> {
    if let Some(app_error) = error.downcast_ref::<AppError>() {
        return Some(app_error.classification());
    }
    if let Some(storage_error) = error.downcast_ref::<StorageError>() {
        return Some(storage_error.classification());
    }
    error
        .downcast_ref::<HandlerError>()
        .map(Classify::classification)
}

impl Classify for Box<dyn StdError + Send + Sync> {
    fn classification(&self) -> Classification {
        let error: &(dyn StdError + 'static) = self.as_ref();
        classification_of(error)
    }
}

/// Error type returned by the user handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A failure the handler classified itself.
    #[error(transparent)]
    App(#[from] AppError),
    /// A storage adapter failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Classify for HandlerError {
    fn classification(&self) -> Classification {
        match self {
            Self::App(err) => err.classification(),
            Self::Storage(err) => err.classification(),
        }
    }
}

#[cfg(test)]
mod tests;
