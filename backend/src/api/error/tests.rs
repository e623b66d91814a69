//! Tests for error classification.

use super::*;
use rstest::rstest;

/// Error source that relies on the default classification.
#[derive(Debug)]
struct Opaque(&'static str);

impl std::fmt::Display for Opaque {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Classify for Opaque {}

fn boxed(message: &str) -> Box<dyn StdError + Send + Sync> {
    message.into()
}

#[test]
fn sentinel_not_found_maps_to_404() {
    let classified = classify(&StorageError::not_found("42"));
    assert_eq!(classified.status, StatusCode::NOT_FOUND);
    assert!(classified.error.is(Sentinel::NotFound));
    insta::assert_json_snapshot!(classified.error, @r#"
    {
      "message": "not found",
      "developer_message": ""
    }
    "#);
}

#[test]
fn classification_is_deterministic() {
    let error = StorageError::not_found("42");
    let first = serde_json::to_vec(&classify(&error).error).expect("body serialises");
    let second = serde_json::to_vec(&classify(&error).error).expect("body serialises");
    assert_eq!(first, second);
}

#[rstest]
#[case::opaque(classify(&Opaque("boom")))]
#[case::boxed(classify(&boxed("boom")))]
fn unrecognised_errors_map_to_500_with_text(#[case] classified: ClassifiedError) {
    assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(classified.error.code(), ErrorCode::Internal);
    assert_eq!(classified.error.message(), "internal system error");
    assert!(classified.error.developer_message().contains("boom"));
}

#[test]
fn explicit_errors_keep_their_classification() {
    let error = AppError::new(ErrorCode::InvalidRequest, "test123", "test213");
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::to_string(&classified.error).expect("body serialises"),
        r#"{"message":"test123","developer_message":"test213"}"#
    );
}

#[test]
fn boxed_app_errors_are_not_downgraded() {
    let error: Box<dyn StdError + Send + Sync> = Box::new(AppError::conflict("taken"));
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::CONFLICT);
    assert_eq!(classified.error.message(), "taken");
}

/// Error that adds context around a lower-level failure.
#[derive(Debug, thiserror::Error)]
#[error("loading user: {0}")]
struct Loading(#[source] StorageError);

/// Context wrapper around an explicit error.
#[derive(Debug, thiserror::Error)]
#[error("handling request: {0}")]
struct Handling(#[source] AppError);

#[test]
fn boxed_handler_errors_keep_the_sentinel() {
    let error: Box<dyn StdError + Send + Sync> =
        Box::new(HandlerError::from(StorageError::not_found("42")));
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::NOT_FOUND);
    assert!(classified.error.is(Sentinel::NotFound));
}

#[test]
fn sentinels_are_found_through_the_source_chain() {
    let error: Box<dyn StdError + Send + Sync> =
        Box::new(Loading(StorageError::not_found("42")));
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::NOT_FOUND);
    assert!(classified.error.is(Sentinel::NotFound));
}

#[test]
fn explicit_errors_are_found_through_the_source_chain() {
    let error: Box<dyn StdError + Send + Sync> =
        Box::new(Handling(AppError::conflict("email already registered")));
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::CONFLICT);
    assert_eq!(classified.error.message(), "email already registered");
}

#[test]
fn chains_without_known_errors_stay_unrecognised() {
    #[derive(Debug, thiserror::Error)]
    #[error("decoding row: {0}")]
    struct Decoding(#[source] std::io::Error);

    let error: Box<dyn StdError + Send + Sync> =
        Box::new(Decoding(std::io::Error::other("eof")));
    assert_eq!(classification_of(error.as_ref()), Classification::Unrecognized);
    let classified = classify(&error);
    assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(classified.error.developer_message(), "decoding row: eof");
}

#[rstest]
#[case(StorageError::not_found("a"), StatusCode::NOT_FOUND)]
#[case(StorageError::invalid_id("zz"), StatusCode::BAD_REQUEST)]
#[case(StorageError::connection("refused"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(StorageError::query("cursor closed"), StatusCode::INTERNAL_SERVER_ERROR)]
fn storage_errors_map_to_statuses(#[case] error: StorageError, #[case] status: StatusCode) {
    assert_eq!(classify(&error).status, status);
    assert_eq!(classify(&HandlerError::from(error)).status, status);
}

#[test]
fn storage_failures_preserve_the_original_text() {
    let classified = classify(&StorageError::query("failed to decode user"));
    assert_eq!(
        classified.error.developer_message(),
        "user storage query failed: failed to decode user"
    );
}

#[test]
fn invalid_ids_explain_themselves_to_developers() {
    let classified = classify(&StorageError::invalid_id("zz"));
    assert_eq!(classified.error.message(), "invalid user id");
    assert_eq!(classified.error.developer_message(), "invalid user id: zz");
}

#[rstest]
#[case(Box::new(Opaque("")) as Box<dyn Classify>)]
#[case(Box::new(AppError::new(ErrorCode::Forbidden, " ", "")) as Box<dyn Classify>)]
#[case(Box::new(StorageError::connection("")) as Box<dyn Classify>)]
#[case(Box::new(HandlerError::from(AppError::unauthorized(""))) as Box<dyn Classify>)]
fn every_error_resolves_to_a_message_and_standard_status(#[case] error: Box<dyn Classify>) {
    let classified = classify(error.as_ref());
    assert!(!classified.error.message().trim().is_empty());
    assert!(classified.status.canonical_reason().is_some());
    assert!((100..=599).contains(&classified.status.as_u16()));
}

#[test]
fn absent_errors_produce_no_classification() {
    assert_eq!(classify_optional::<AppError>(None), None);
}

#[test]
fn present_errors_classify_like_classify() {
    let error = StorageError::not_found("7");
    assert_eq!(classify_optional(Some(&error)), Some(classify(&error)));
}
