// Requests that are settled before any query runs, so the pool never connects.
mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use store_rating_api::{
    config::Environment, middleware::auth::AuthUser, models::Role, routes::build_app,
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

fn app(state: &AppState) -> Router {
    build_app(state.clone(), &["http://localhost:3000".to_string()])
}

async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    caller: Option<&AuthUser>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, json) = send_raw(state, method, uri, caller, body).await;
    (status, json)
}

/// Like `send`, also returning the response content type.
async fn send_raw(
    state: &AppState,
    method: Method,
    uri: &str,
    caller: Option<&AuthUser>,
    body: Option<Value>,
) -> (StatusCode, String, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = caller {
        builder = builder.header(header::AUTHORIZATION, common::bearer(state, user));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app(state).oneshot(request).await.expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, json)
}

fn assert_enveloped_bad_request(status: StatusCode, content_type: &str, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.starts_with("application/json"), "{content_type}");
    assert!(body["message"].is_string(), "{body}");
    assert_eq!(body["data"]["error"], body["message"]);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let state = common::lazy_state();
    let (status, body) = send(&state, Method::GET, "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let state = common::lazy_state();
    let request = Request::builder()
        .uri("/api/ratings/user")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .expect("request");
    let response = app(&state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn normal_user_cannot_list_users() {
    let state = common::lazy_state();
    let user = common::auth_user(Role::Normal);
    let (status, _) = send(&state, Method::GET, "/api/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn store_owner_cannot_see_dashboard() {
    let state = common::lazy_state();
    let owner = common::auth_user(Role::StoreOwner);
    let (status, _) = send(
        &state,
        Method::GET,
        "/api/users/dashboard-stats",
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn normal_user_cannot_create_store() {
    let state = common::lazy_state();
    let user = common::auth_user(Role::Normal);
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/stores",
        Some(&user),
        Some(json!({ "name": "My Store", "email": "store@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_cannot_submit_rating() {
    let state = common::lazy_state();
    let admin = common::auth_user(Role::Admin);
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/ratings",
        Some(&admin),
        Some(json!({ "storeId": Uuid::new_v4(), "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rating_outside_range_is_bad_request() {
    let state = common::lazy_state();
    let user = common::auth_user(Role::Normal);
    for rating in [0, 6] {
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/ratings",
            Some(&user),
            Some(json!({ "storeId": Uuid::new_v4(), "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_eq!(body["message"], "Validation error");
        assert!(body["data"]["details"][0]
            .as_str()
            .is_some_and(|d| d.contains("rating")));
    }
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let state = common::lazy_state();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .expect("request");
    let response = app(&state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_validates_before_touching_storage() {
    let state = common::lazy_state();
    let (status, body) = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "J", "email": "nope", "password": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["details"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let state = common::lazy_state();
    let admin = common::auth_user(Role::Admin);
    let uri = format!("/api/users/{}", admin.user_id);
    let (status, body) = send(&state, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot delete your own account");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let state = common::lazy_state();
    let (status, body) = send(&state, Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/nothing-here");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let state = common::lazy_state();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = app(&state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn non_uuid_ids_are_enveloped_bad_requests() {
    let state = common::lazy_state();
    let user = common::auth_user(Role::Normal);
    let admin = common::auth_user(Role::Admin);

    let (status, ct, body) = send_raw(&state, Method::GET, "/api/stores/42", Some(&user), None).await;
    assert_enveloped_bad_request(status, &ct, &body);

    let (status, ct, body) = send_raw(
        &state,
        Method::GET,
        "/api/ratings/store/42",
        Some(&user),
        None,
    )
    .await;
    assert_enveloped_bad_request(status, &ct, &body);

    let (status, ct, body) = send_raw(
        &state,
        Method::PUT,
        "/api/users/42",
        Some(&admin),
        Some(json!({ "name": "Someone", "email": "someone@example.com", "role": "normal" })),
    )
    .await;
    assert_enveloped_bad_request(status, &ct, &body);

    let (status, ct, body) =
        send_raw(&state, Method::DELETE, "/api/users/not-a-uuid", Some(&admin), None).await;
    assert_enveloped_bad_request(status, &ct, &body);
}

#[tokio::test]
async fn bad_query_parameters_are_enveloped_bad_requests() {
    let state = common::lazy_state();
    let user = common::auth_user(Role::Normal);
    let admin = common::auth_user(Role::Admin);

    for uri in [
        "/api/stores?sortBy=rating",
        "/api/stores?page=abc",
        "/api/stores?sortOrder=sideways",
        "/api/stores?ownerId=7",
    ] {
        let (status, ct, body) = send_raw(&state, Method::GET, uri, Some(&user), None).await;
        assert_enveloped_bad_request(status, &ct, &body);
    }

    let (status, ct, body) =
        send_raw(&state, Method::GET, "/api/users?limit=ten", Some(&admin), None).await;
    assert_enveloped_bad_request(status, &ct, &body);
}

#[tokio::test]
async fn error_debug_text_follows_environment() {
    let dev = common::lazy_state_in(Environment::Development);
    let (status, body) = send(&dev, Method::GET, "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(
        body["data"]["debug"]
            .as_str()
            .is_some_and(|d| d.contains("Unauthorized")),
        "{body}"
    );
    assert_eq!(body["message"], "No token provided");

    let prod = common::lazy_state_in(Environment::Production);
    let (status, body) = send(&prod, Method::GET, "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].get("debug").is_none(), "{body}");
    assert_eq!(body["data"]["error"], "No token provided");
}
