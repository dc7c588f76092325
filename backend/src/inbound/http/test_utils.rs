//! Test helpers for inbound HTTP components.
//!
//! Apps are wired through [`crate::composition`] over in-memory
//! repositories, so handler tests run the real services.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::Trace;
use crate::composition::{Repositories, build_services};
use crate::domain::{PasswordHashing, PasswordPolicy};

use super::state::HttpState;

/// Cheap argon2 costs for tests.
pub fn test_hashing() -> PasswordHashing {
    PasswordHashing::new(8, 1, 1).expect("cheap argon2 params are valid")
}

/// HTTP state over fresh in-memory repositories.
pub fn in_memory_state() -> HttpState {
    build_services(
        Repositories::in_memory(),
        PasswordPolicy::default(),
        test_hashing(),
    )
    .state
}

/// Full API app over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(super::configure)
}

/// Send a JSON request and return status plus parsed body.
///
/// Empty bodies come back as `Value::Null`.
pub async fn send_json<S, B>(
    app: &S,
    method: actix_web::http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut request = actix_test::TestRequest::default().method(method).uri(uri);
    if let Some(token) = token {
        request = request.insert_header(("Authorization", format!("Token {token}")));
    }
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, value)
}

/// Register `email` and return a fresh token for it.
pub async fn register_and_login<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let password = "password1234";
    let (status, _) = send_json(
        app,
        actix_web::http::Method::POST,
        "/user/create",
        None,
        Some(json!({ "email": email, "password": password, "name": "Test cook" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration succeeds");

    let (status, body) = send_json(
        app,
        actix_web::http::Method::POST,
        "/user/token",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login succeeds");
    body["token"]
        .as_str()
        .expect("token is a string")
        .to_owned()
}
