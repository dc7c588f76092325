//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde::Deserialize;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::method_not_allowed("no"), StatusCode::METHOD_NOT_ALLOWED)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_payload(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialises")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let redacted = response_payload(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_their_details() {
    let error = Error::invalid_request("email taken")
        .with_details(json!({"field": "email", "code": "duplicate_email"}));

    let payload = response_payload(error, StatusCode::BAD_REQUEST, None).await;

    assert_eq!(payload.message(), "email taken");
    assert_eq!(
        payload.details(),
        Some(&json!({"field": "email", "code": "duplicate_email"}))
    );
}

#[given("an internal error carrying a trace id")]
fn an_internal_error_carrying_a_trace_id() -> Error {
    Error::internal("db password is hunter2").with_trace_id(TRACE_ID)
}

#[when("the adapter redacts the client payload")]
fn the_adapter_redacts_the_client_payload(error: Error) -> Error {
    redact_if_internal(&error)
}

#[then("clients see the generic message and the same trace id")]
fn clients_see_the_generic_message_and_the_same_trace_id(redacted: Error) {
    assert_eq!(redacted.message(), "Internal server error");
    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn redaction_scenario() {
    let error = an_internal_error_carrying_a_trace_id();
    let redacted = the_adapter_redacts_the_client_payload(error);
    clients_see_the_generic_message_and_the_same_trace_id(redacted);
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

#[derive(Deserialize)]
struct Body {
    name: String,
}

fn extractor_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .route(
            "/body",
            web::post().to(|body: web::Json<Body>| async move {
                HttpResponse::Ok().body(body.into_inner().name)
            }),
        )
        .route(
            "/items/{id}",
            web::get().to(|_: web::Path<uuid::Uuid>| async { HttpResponse::Ok().finish() }),
        )
}

#[rstest]
#[case(r#"{"name": "#, "invalid_json")]
#[case(r#"{"other": 1}"#, "invalid_json")]
#[actix_web::test]
async fn malformed_json_uses_the_error_envelope(#[case] body: &str, #[case] code: &str) {
    let app = actix_test::init_service(extractor_app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/body")
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_owned())
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(response).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.details(), Some(&json!({ "code": code })));
}

#[rstest]
#[actix_web::test]
async fn unparseable_path_ids_are_not_found() {
    let app = actix_test::init_service(extractor_app()).await;
    let request = actix_test::TestRequest::get()
        .uri("/items/not-a-uuid")
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
