//! Tests for the response writer and the fallible handler adapter.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::models::{ErrorCode, Sentinel};
use crate::storage::StorageError;
use actix_web::{App, test as actix_test};
use serde_json::{Value, json};

#[test]
fn second_status_is_rejected_and_first_is_kept() {
    let mut writer = ResponseWriter::new();
    writer
        .write_status(StatusCode::NO_CONTENT)
        .expect("first status is accepted");
    assert_eq!(
        writer.write_status(StatusCode::BAD_REQUEST),
        Err(WriteError::StatusAlreadySent {
            sent: StatusCode::NO_CONTENT,
            attempted: StatusCode::BAD_REQUEST,
        })
    );
    assert_eq!(writer.finish().status(), StatusCode::NO_CONTENT);
}

#[test]
fn headers_are_frozen_once_status_is_sent() {
    let mut writer = ResponseWriter::new();
    writer.write(b"partial");
    let result = writer.insert_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    assert_eq!(
        result,
        Err(WriteError::HeadersAlreadySent {
            sent: StatusCode::OK
        })
    );
    assert!(writer.finish().headers().get(header::CONTENT_TYPE).is_none());
}

#[test]
fn untouched_writer_finishes_as_empty_ok() {
    let response = ResponseWriter::new().finish();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().is_empty());
}

#[actix_web::test]
async fn write_error_does_not_overwrite_committed_output() {
    let mut writer = ResponseWriter::new();
    writer
        .write_status(StatusCode::NO_CONTENT)
        .expect("handler status");
    writer.write(b"this is update user");

    let classified = classify(&AppError::internal(std::io::Error::other("late failure")));
    let result = write_error(&mut writer, &classified);

    assert!(result.is_err());
    let response = writer.finish();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = actix_web::body::to_bytes(response.into_body())
        .await
        .expect("body is readable");
    assert_eq!(body.as_ref(), b"this is update user");
}

#[actix_web::test]
async fn write_error_sets_json_content_type_status_and_body() {
    let mut writer = ResponseWriter::new();
    write_error(&mut writer, &classify(&Sentinel::NotFound.to_error())).expect("fresh writer");
    let response = writer.finish();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE),
        Some(&HeaderValue::from_static("application/json"))
    );
    let body = actix_web::body::to_bytes(response.into_body())
        .await
        .expect("body is readable");
    assert_eq!(
        body.as_ref(),
        br#"{"message":"not found","developer_message":""}"#
    );
}

async fn explicit() -> Result<HttpResponse, AppError> {
    Err(AppError::new(ErrorCode::InvalidRequest, "test123", "test213"))
}

async fn missing() -> Result<HttpResponse, StorageError> {
    Err(StorageError::not_found("42"))
}

async fn boom() -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
    Err("boom".into())
}

async fn no_content() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::NoContent().finish())
}

async fn toggle(mode: web::Path<String>) -> Result<&'static str, AppError> {
    match mode.as_str() {
        "fail" => Err(AppError::conflict("first request failed")),
        _ => Ok("ok"),
    }
}

async fn counted(hits: web::Data<AtomicUsize>) -> Result<HttpResponse, AppError> {
    hits.fetch_add(1, Ordering::SeqCst);
    Err(AppError::forbidden("counted"))
}

async fn echo(body: web::Json<Value>) -> Result<web::Json<Value>, AppError> {
    Ok(body)
}

fn test_app(
    hits: web::Data<AtomicUsize>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(hits)
        .app_data(json_config())
        .route("/explicit", web::get().to(fallible(explicit)))
        .route("/missing", web::get().to(fallible(missing)))
        .route("/boom", web::get().to(fallible(boom)))
        .route("/no-content", web::get().to(fallible(no_content)))
        .route("/toggle/{mode}", web::get().to(fallible(toggle)))
        .route("/counted", web::get().to(fallible(counted)))
        .route("/echo", web::post().to(fallible(echo)))
        .default_service(web::to(not_found))
}

async fn get_json(uri: &str) -> (StatusCode, Option<String>, Value) {
    let app = actix_test::init_service(test_app(web::Data::new(AtomicUsize::new(0)))).await;
    let request = actix_test::TestRequest::get().uri(uri).to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body: Value = actix_test::read_body_json(response).await;
    (status, content_type, body)
}

#[actix_web::test]
async fn explicit_app_error_is_written_verbatim() {
    let app = actix_test::init_service(test_app(web::Data::new(AtomicUsize::new(0)))).await;
    let request = actix_test::TestRequest::get().uri("/explicit").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = actix_test::read_body(response).await;
    assert_eq!(
        body.as_ref(),
        br#"{"message":"test123","developer_message":"test213"}"#
    );
}

#[actix_web::test]
async fn sentinel_errors_become_404() {
    let (status, content_type, body) = get_json("/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, json!({"message": "not found", "developer_message": ""}));
}

#[actix_web::test]
async fn unrecognised_errors_become_500_with_text() {
    let (status, content_type, body) = get_json("/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        json!({"message": "internal system error", "developer_message": "boom"})
    );
}

#[actix_web::test]
async fn success_passes_through_without_extra_writes() {
    let app = actix_test::init_service(test_app(web::Data::new(AtomicUsize::new(0)))).await;
    let request = actix_test::TestRequest::get().uri("/no-content").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    assert!(actix_test::read_body(response).await.is_empty());
}

#[actix_web::test]
async fn consecutive_requests_are_classified_independently() {
    let app = actix_test::init_service(test_app(web::Data::new(AtomicUsize::new(0)))).await;

    let failing = actix_test::TestRequest::get().uri("/toggle/fail").to_request();
    let response = actix_test::call_service(&app, failing).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let passing = actix_test::TestRequest::get().uri("/toggle/pass").to_request();
    let response = actix_test::call_service(&app, passing).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_ne!(
        response.headers().get(header::CONTENT_TYPE),
        Some(&HeaderValue::from_static("application/json"))
    );
    assert_eq!(actix_test::read_body(response).await.as_ref(), b"ok");
}

#[actix_web::test]
async fn wrapped_handler_runs_once_per_request() {
    let hits = web::Data::new(AtomicUsize::new(0));
    let app = actix_test::init_service(test_app(hits.clone())).await;
    for expected in 1..=2 {
        let request = actix_test::TestRequest::get().uri("/counted").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), expected);
    }
}

#[actix_web::test]
async fn malformed_json_bodies_are_invalid_requests() {
    let app = actix_test::init_service(test_app(web::Data::new(AtomicUsize::new(0)))).await;
    let request = actix_test::TestRequest::post()
        .uri("/echo")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("invalid request body")
    );
    assert!(
        body.get("developer_message")
            .and_then(Value::as_str)
            .is_some_and(|text| !text.is_empty())
    );
}

#[actix_web::test]
async fn unmatched_routes_use_the_not_found_body() {
    let (status, _, body) = get_json("/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "not found", "developer_message": ""}));
}
