//! Integration tests for the session/authentication endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{
    get, post_json, response_cookie, seed_user, send, send_json, test_app,
};

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn json_get(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

//=========================================================================================
// Register
//=========================================================================================

#[tokio::test]
async fn registers_a_new_user() {
    let (app, state) = test_app();

    let (status, body) = send_json(
        app,
        post_json(
            "/api/sessions/register",
            json!({
                "first_name": "Juan",
                "last_name": "Perez",
                "email": "juan@example.com",
                "password": "password123"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let new_id: Uuid = body["payload"].as_str().unwrap().parse().unwrap();

    let stored = state.db.get_user_by_id(new_id).await.unwrap();
    assert_eq!(stored.email, "juan@example.com");
    // Stored as an argon2 hash, not the plaintext.
    assert!(stored.password.unwrap().starts_with("$argon2"));
}

#[tokio::test]
async fn register_requires_all_fields() {
    let (app, _state) = test_app();

    let (status, body) = send_json(
        app,
        post_json(
            "/api/sessions/register",
            json!({ "first_name": "Juan", "email": "juan@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incomplete values");
}

#[tokio::test]
async fn register_rejects_existing_email() {
    let (app, state) = test_app();
    seed_user(&state, "taken@example.com", "password123").await;

    let (status, body) = send_json(
        app,
        post_json(
            "/api/sessions/register",
            json!({
                "first_name": "Ana",
                "last_name": "Alvarez",
                "email": "taken@example.com",
                "password": "password123"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
}

//=========================================================================================
// Login / Logout / Current
//=========================================================================================

#[tokio::test]
async fn login_sets_session_and_token_cookies() {
    let (app, state) = test_app();
    let user = seed_user(&state, "login@example.com", "password123").await;

    let response = send(
        app,
        post_json(
            "/api/sessions/login",
            json!({ "email": "login@example.com", "password": "password123" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let session = response_cookie(&response, "session").expect("session cookie");
    let token = response_cookie(&response, "auth_token").expect("auth_token cookie");
    assert!(!session.is_empty());
    assert!(token.contains('.'));

    // The session is live server-side and last_connection was stamped.
    let user_id = state.db.validate_auth_session(&session).await.unwrap();
    assert_eq!(user_id, user.id);
    let stored = state.db.get_user_by_id(user.id).await.unwrap();
    assert!(stored.last_connection.is_some());
}

#[tokio::test]
async fn login_answers_uniformly_on_bad_credentials() {
    let (app, state) = test_app();
    seed_user(&state, "login@example.com", "password123").await;

    let (status, body) = send_json(
        app.clone(),
        post_json(
            "/api/sessions/login",
            json!({ "email": "login@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect credentials");

    let (status, body) = send_json(
        app.clone(),
        post_json(
            "/api/sessions/login",
            json!({ "email": "nobody@example.com", "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect credentials");

    let (status, body) = send_json(
        app,
        post_json("/api/sessions/login", json!({ "email": "login@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incomplete values");
}

#[tokio::test]
async fn current_round_trips_the_token_cookie() {
    let (app, state) = test_app();
    seed_user(&state, "current@example.com", "password123").await;

    let response = send(
        app.clone(),
        post_json(
            "/api/sessions/login",
            json!({ "email": "current@example.com", "password": "password123" }),
        ),
    )
    .await;
    let token = response_cookie(&response, "auth_token").unwrap();

    let (status, body) = send_json(
        app.clone(),
        get_with_cookie("/api/sessions/current", &format!("auth_token={token}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["email"], "current@example.com");
    assert_eq!(body["payload"]["role"], "user");

    let (status, body) = send_json(app.clone(), get("/api/sessions/current")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let (status, body) = send_json(
        app,
        get_with_cookie("/api/sessions/current", "auth_token=tampered.token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let (app, state) = test_app();
    seed_user(&state, "logout@example.com", "password123").await;

    let response = send(
        app.clone(),
        post_json(
            "/api/sessions/login",
            json!({ "email": "logout@example.com", "password": "password123" }),
        ),
    )
    .await;
    let session = response_cookie(&response, "session").unwrap();

    let (status, body) = send_json(
        app.clone(),
        post_with_cookie("/api/sessions/logout", &format!("session={session}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");
    assert!(state.db.validate_auth_session(&session).await.is_err());

    // The same cookie no longer counts as an active session.
    let (status, body) = send_json(
        app.clone(),
        post_with_cookie("/api/sessions/logout", &format!("session={session}")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active session");

    let (status, body) = send_json(app, post_json("/api/sessions/logout", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active session");
}

//=========================================================================================
// Unprotected demo flow
//=========================================================================================

#[tokio::test]
async fn unprotected_flow_round_trips_the_full_user() {
    let (app, state) = test_app();
    seed_user(&state, "demo@example.com", "password123").await;

    let response = send(
        app.clone(),
        json_get(
            "/api/sessions/unprotectedLogin",
            json!({ "email": "demo@example.com", "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = response_cookie(&response, "unprotected_token").unwrap();

    let (status, body) = send_json(
        app,
        get_with_cookie(
            "/api/sessions/unprotectedCurrent",
            &format!("unprotected_token={token}"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["email"], "demo@example.com");
    // The demo flow leaks the stored hash; that is the documented insecurity.
    assert!(body["payload"]["password"]
        .as_str()
        .unwrap()
        .starts_with("$argon2"));
}

#[tokio::test]
async fn unprotected_login_error_paths() {
    let (app, state) = test_app();
    seed_user(&state, "demo@example.com", "password123").await;

    let (status, body) = send_json(
        app.clone(),
        json_get(
            "/api/sessions/unprotectedLogin",
            json!({ "email": "nobody@example.com", "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User doesn't exist");

    let (status, body) = send_json(
        app.clone(),
        json_get(
            "/api/sessions/unprotectedLogin",
            json!({ "email": "demo@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect password");

    let (status, body) = send_json(
        app.clone(),
        json_get("/api/sessions/unprotectedLogin", json!({ "email": "demo@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incomplete values");

    let (status, body) = send_json(app, get("/api/sessions/unprotectedCurrent")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}
