//! Adapt fallible handlers into handlers that always respond.
//!
//! [`fallible`] wraps an Actix handler returning `Result<R, E>`. Successful
//! responses pass through untouched; errors are classified and written as a
//! JSON body through a [`ResponseWriter`], which commits the status at most
//! once.

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::{Either, Handler, HttpResponse, Responder, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, warn};

use super::error::{Classify, ClassifiedError, classify};
use crate::models::AppError;

const FALLBACK_BODY: &[u8] =
    br#"{"message":"internal system error","developer_message":"failed to encode error body"}"#;

/// Misuse of a [`ResponseWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// A status was written after one had already been committed.
    #[error("status {attempted} not written: {sent} was already sent")]
    StatusAlreadySent {
        /// Status committed first.
        sent: StatusCode,
        /// Status of the rejected write.
        attempted: StatusCode,
    },
    /// A header was changed after the status had been committed.
    #[error("headers cannot change after status {sent} was sent")]
    HeadersAlreadySent {
        /// Status committed first.
        sent: StatusCode,
    },
}

/// Buffered response whose status line is committed exactly once.
///
/// Writing a body before a status commits `200 OK`, as a plain HTTP response
/// writer would.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use rest_api_service::api::respond::{ResponseWriter, WriteError};
///
/// let mut writer = ResponseWriter::new();
/// writer.write_status(StatusCode::NOT_FOUND).expect("first status");
/// let second = writer.write_status(StatusCode::INTERNAL_SERVER_ERROR);
/// assert!(matches!(second, Err(WriteError::StatusAlreadySent { .. })));
/// assert_eq!(writer.status(), Some(StatusCode::NOT_FOUND));
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    /// Start an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Status committed so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Set a header before the status is committed.
    ///
    /// # Errors
    /// [`WriteError::HeadersAlreadySent`] once a status has been written.
    pub fn insert_header(
        &mut self,
        name: HeaderName,
        value: HeaderValue,
    ) -> Result<(), WriteError> {
        if let Some(sent) = self.status {
            return Err(WriteError::HeadersAlreadySent { sent });
        }
        self.headers.insert(name, value);
        Ok(())
    }

    /// Commit the status line.
    ///
    /// # Errors
    /// [`WriteError::StatusAlreadySent`] when a status was already committed;
    /// the committed status is kept.
    pub fn write_status(&mut self, status: StatusCode) -> Result<(), WriteError> {
        match self.status {
            Some(sent) => Err(WriteError::StatusAlreadySent {
                sent,
                attempted: status,
            }),
            None => {
                self.status = Some(status);
                Ok(())
            }
        }
    }

    /// Append body bytes, committing `200 OK` if no status was written.
    pub fn write(&mut self, bytes: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(bytes);
    }

    /// Finish into an Actix response. An untouched writer yields `200 OK`
    /// with an empty body.
    pub fn finish(self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status.unwrap_or(StatusCode::OK));
        for (name, value) in &self.headers {
            builder.insert_header((name.clone(), value.clone()));
        }
        builder.body(self.body)
    }
}

/// Write `classified` as a JSON error response into `writer`.
///
/// # Errors
/// Propagates [`WriteError`] when the writer already committed a status;
/// nothing is written in that case.
pub fn write_error(
    writer: &mut ResponseWriter,
    classified: &ClassifiedError,
) -> Result<(), WriteError> {
    let body = serde_json::to_vec(&classified.error).unwrap_or_else(|err| {
        error!(error = %err, "failed to encode error body");
        FALLBACK_BODY.to_vec()
    });
    writer.insert_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    )?;
    writer.write_status(classified.status)?;
    writer.write(&body);
    Ok(())
}

/// Classify `err`, log it, and render the error response.
pub fn error_response<E>(err: &E) -> HttpResponse
where
    E: Classify + std::fmt::Debug + ?Sized,
{
    let classified = classify(err);
    log_classified(err, &classified);
    let mut writer = ResponseWriter::new();
    if let Err(misuse) = write_error(&mut writer, &classified) {
        warn!(error = %misuse, "error response not written");
    }
    writer.finish()
}

fn log_classified<E>(err: &E, classified: &ClassifiedError)
where
    E: std::fmt::Debug + ?Sized,
{
    let status = classified.status.as_u16();
    let code = classified.error.code().as_str();
    let developer_message = classified.error.developer_message();
    if classified.status.is_server_error() {
        error!(status, code, developer_message, cause = ?err, "request failed");
    } else {
        debug!(status, code, developer_message, cause = ?err, "request rejected");
    }
}

/// Handler adapter produced by [`fallible`].
#[derive(Debug, Clone, Copy)]
pub struct Fallible<H> {
    handler: H,
}

/// Wrap `handler` so every error it returns becomes a classified JSON
/// response.
///
/// The wrapped handler is invoked exactly once per request and keeps no state
/// between requests.
///
/// # Examples
/// ```
/// use actix_web::{web, App, HttpResponse};
/// use rest_api_service::api::respond::fallible;
/// use rest_api_service::models::AppError;
///
/// async fn missing() -> Result<HttpResponse, AppError> {
///     Err(AppError::not_found("nothing here"))
/// }
///
/// let app = App::new().route("/missing", web::get().to(fallible(missing)));
/// ```
pub fn fallible<H>(handler: H) -> Fallible<H> {
    Fallible { handler }
}

impl<H, Args, R, E> Handler<Args> for Fallible<H>
where
    H: Handler<Args, Output = Result<R, E>>,
    H::Future: 'static,
    R: Responder + 'static,
    E: Classify + std::fmt::Debug + 'static,
{
    type Output = Either<R, HttpResponse>;
    type Future = LocalBoxFuture<'static, Self::Output>;

    fn call(&self, args: Args) -> Self::Future {
        let fut = self.handler.call(args);
        Box::pin(async move {
            match fut.await {
                Ok(reply) => Either::Left(reply),
                Err(err) => Either::Right(error_response(&err)),
            }
        })
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self)
    }
}

/// JSON extractor settings that report malformed bodies as
/// `invalid_request` errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::invalid_request("invalid request body")
            .with_developer_message(err.to_string())
            .into()
    })
}

/// Fallback for unmatched routes: the canonical not-found body.
pub async fn not_found() -> HttpResponse {
    error_response(&crate::models::Sentinel::NotFound.to_error())
}

#[cfg(test)]
mod tests;
