//! Tests for tag and ingredient handlers.

use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{in_memory_state, register_and_login, send_json, test_app};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("list body")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect()
}

#[rstest]
#[case("/recipe/tags")]
#[case("/recipe/ingredients")]
#[actix_web::test]
async fn listing_requires_a_token(#[case] uri: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;

    let (status, body) = send_json(&app, Method::GET, uri, None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case("/recipe/tags")]
#[case("/recipe/ingredients")]
#[actix_web::test]
async fn lists_are_owner_scoped_and_reverse_ordered(#[case] uri: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let mine = register_and_login(&app, "mine@example.com").await;
    let theirs = register_and_login(&app, "theirs@example.com").await;

    for name in ["Kale", "Salt"] {
        let (status, _) =
            send_json(&app, Method::POST, uri, Some(&mine), Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send_json(
        &app,
        Method::POST,
        uri,
        Some(&theirs),
        Some(json!({ "name": "Pepper" })),
    )
    .await;

    let (status, body) = send_json(&app, Method::GET, uri, Some(&mine), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Salt", "Kale"]);
}

#[rstest]
#[actix_web::test]
async fn create_returns_the_new_record() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let token = register_and_login(&app, "cook@example.com").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/recipe/tags",
        Some(&token),
        Some(json!({ "name": "  Vegan " })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Vegan");
    assert!(body["id"].is_string());
}

#[rstest]
#[case(json!({}), "missing_field")]
#[case(json!({ "name": "   " }), "invalid_value")]
#[actix_web::test]
async fn create_rejects_blank_names(#[case] payload: Value, #[case] code: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let token = register_and_login(&app, "cook@example.com").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/recipe/ingredients",
        Some(&token),
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "name");
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn detail_and_rename_are_owner_scoped() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let owner = register_and_login(&app, "owner@example.com").await;
    let stranger = register_and_login(&app, "stranger@example.com").await;
    let (_, created) = send_json(
        &app,
        Method::POST,
        "/recipe/tags",
        Some(&owner),
        Some(json!({ "name": "Breakfast" })),
    )
    .await;
    let uri = format!("/recipe/tags/{}", created["id"].as_str().expect("id"));

    let (hidden, _) = send_json(&app, Method::GET, &uri, Some(&stranger), None).await;
    let (blocked, _) = send_json(
        &app,
        Method::PATCH,
        &uri,
        Some(&stranger),
        Some(json!({ "name": "Stolen" })),
    )
    .await;
    let (renamed, body) = send_json(
        &app,
        Method::PATCH,
        &uri,
        Some(&owner),
        Some(json!({ "name": "Brunch" })),
    )
    .await;
    let (fetched, detail) = send_json(&app, Method::GET, &uri, Some(&owner), None).await;

    assert_eq!(hidden, StatusCode::NOT_FOUND);
    assert_eq!(blocked, StatusCode::NOT_FOUND);
    assert_eq!(renamed, StatusCode::OK);
    assert_eq!(body["name"], "Brunch");
    assert_eq!(fetched, StatusCode::OK);
    assert_eq!(detail, body);
}

#[rstest]
#[case(Method::GET)]
#[case(Method::PATCH)]
#[actix_web::test]
async fn malformed_ids_are_not_found(#[case] method: Method) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let token = register_and_login(&app, "cook@example.com").await;

    let (status, body) = send_json(
        &app,
        method,
        "/recipe/ingredients/not-a-uuid",
        Some(&token),
        Some(json!({ "name": "Salt" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn deletion_is_not_routed() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let token = register_and_login(&app, "cook@example.com").await;

    let (status, body) =
        send_json(&app, Method::DELETE, "/recipe/tags", Some(&token), None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "method_not_allowed");
}
