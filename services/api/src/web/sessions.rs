//! services/api/src/web/sessions.rs
//!
//! Authentication endpoints: register, login, logout, current, and the
//! deliberately insecure "unprotected" demo pair.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use adoptme_core::domain::{NewUser, Role, User};

use crate::token::{self, SessionClaims, UnprotectedClaims};
use crate::web::response::{self, ApiFailure};
use crate::web::state::AppState;

const SESSION_COOKIE: &str = "session";
const AUTH_TOKEN_COOKIE: &str = "auth_token";
const UNPROTECTED_COOKIE: &str = "unprotected_token";

/// Static signing key for the unprotected demo flow. Insecure on purpose:
/// this pair of endpoints exists to demonstrate what NOT to ship.
const UNPROTECTED_SECRET: &str = "demo-static-token-key";

const SESSION_TTL_DAYS: i64 = 30;
const TOKEN_TTL_HOURS: i64 = 1;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

/// Pulls one cookie value out of the Cookie header, if present.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let prefix = format!("{name}=");
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix(prefix.as_str()))
}

fn set_cookie(name: &str, value: &str, max_age_seconds: i64) -> String {
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_seconds}")
}

fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Verifies a plaintext password against a stored argon2 hash.
fn password_matches(user: &User, password: &str) -> bool {
    let Some(stored) = user.password.as_deref() else {
        return false;
    };
    let Ok(parsed_hash) = PasswordHash::new(stored) else {
        error!("Stored password hash for {} is unparseable", user.id);
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/sessions/register - Create a new account
#[utoipa::path(
    post,
    path = "/api/sessions/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, payload is the new id"),
        (status = 400, description = "Incomplete values or existing email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ApiFailure> {
    let (Some(first_name), Some(last_name), Some(email), Some(password)) =
        (req.first_name, req.last_name, req.email, req.password)
    else {
        return Err(ApiFailure::bad_request("Incomplete values"));
    };

    // 1. Reject duplicate emails before hashing anything.
    let exists = state.db.find_user_by_email(&email).await.map_err(|e| {
        error!("Failed to look up email: {:?}", e);
        ApiFailure::internal("Failed to register user")
    })?;
    if exists.is_some() {
        return Err(ApiFailure::bad_request("User already exists"));
    }

    // 2. Hash the password.
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiFailure::internal("Failed to hash password")
        })?
        .to_string();

    // 3. Create the user.
    let user = state
        .db
        .create_user(NewUser {
            first_name,
            last_name: Some(last_name),
            email,
            password: Some(password_hash),
            role: Role::default(),
        })
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            ApiFailure::internal("Failed to register user")
        })?;

    Ok(response::success(user.id))
}

/// POST /api/sessions/login - Log in and establish a session
#[utoipa::path(
    post,
    path = "/api/sessions/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session and token cookies set"),
        (status = 400, description = "Incomplete values"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiFailure> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiFailure::bad_request("Incomplete values"));
    };

    // 1. Look up the account. Unknown email and bad password answer the same
    //    way so the response does not reveal which one was wrong.
    let user = state
        .db
        .find_user_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {:?}", e);
            ApiFailure::internal("Internal server error")
        })?
        .ok_or_else(|| ApiFailure::unauthorized("Incorrect credentials"))?;

    // 2. Verify the password.
    if !password_matches(&user, &password) {
        return Err(ApiFailure::unauthorized("Incorrect credentials"));
    }

    // 3. Stamp last_connection.
    state.db.touch_last_connection(user.id).await.map_err(|e| {
        error!("Failed to update last_connection for {}: {:?}", user.id, e);
        ApiFailure::internal("Internal server error")
    })?;

    // 4. Create the server-side session.
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state
        .db
        .create_auth_session(&auth_session_id, user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiFailure::internal("Failed to create session")
        })?;

    // 5. Issue the signed token carried by the current endpoint.
    let claims = SessionClaims::for_user(&user, Duration::hours(TOKEN_TTL_HOURS));
    let auth_token = token::sign(&claims, &state.config.token_secret).map_err(|e| {
        error!("Failed to sign session token: {}", e);
        ApiFailure::internal("Failed to create session")
    })?;

    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            set_cookie(
                SESSION_COOKIE,
                &auth_session_id,
                Duration::days(SESSION_TTL_DAYS).num_seconds(),
            ),
        ),
        (
            header::SET_COOKIE,
            set_cookie(
                AUTH_TOKEN_COOKIE,
                &auth_token,
                Duration::hours(TOKEN_TTL_HOURS).num_seconds(),
            ),
        ),
    ]);

    Ok((cookies, response::success_message("Logged in")).into_response())
}

/// POST /api/sessions/logout - End the active session
#[utoipa::path(
    post,
    path = "/api/sessions/logout",
    responses(
        (status = 200, description = "Logged out; cookies cleared"),
        (status = 400, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiFailure> {
    // 1. There must be a live session cookie.
    let auth_session_id = cookie_value(&headers, SESSION_COOKIE)
        .ok_or_else(|| ApiFailure::bad_request("No active session"))?;

    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|_| ApiFailure::bad_request("No active session"))?;

    // 2. Stamp last_connection; a failure here should not block the logout.
    if let Err(e) = state.db.touch_last_connection(user_id).await {
        error!("Failed to update last_connection for {}: {:?}", user_id, e);
    }

    // 3. Destroy the session and clear both cookies.
    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            ApiFailure::internal("Logout failed")
        })?;

    let cookies = AppendHeaders([
        (header::SET_COOKIE, clear_cookie(SESSION_COOKIE)),
        (header::SET_COOKIE, clear_cookie(AUTH_TOKEN_COOKIE)),
    ]);

    Ok((cookies, response::success_message("Logged out")).into_response())
}

/// GET /api/sessions/current - Decode the logged-in user from the token cookie
#[utoipa::path(
    get,
    path = "/api/sessions/current",
    responses(
        (status = 200, description = "Decoded token claims"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn current_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiFailure> {
    let raw = cookie_value(&headers, AUTH_TOKEN_COOKIE)
        .ok_or_else(|| ApiFailure::unauthorized("Invalid token"))?;

    let claims: SessionClaims =
        token::verify(raw, &state.config.token_secret).map_err(|e| {
            error!("Token verification failed: {}", e);
            ApiFailure::unauthorized("Invalid token")
        })?;

    Ok(response::success(claims))
}

/// GET /api/sessions/unprotectedLogin - Demo login with a statically keyed token
///
/// Demo-only: signs the entire user record (password hash included) with a
/// hardcoded key. Kept as an example of the insecure variant of the flow.
#[utoipa::path(
    get,
    path = "/api/sessions/unprotectedLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token cookie set (insecure)"),
        (status = 400, description = "Incomplete values or incorrect password"),
        (status = 404, description = "User doesn't exist")
    )
)]
pub async fn unprotected_login_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<LoginRequest>>,
) -> Result<Response, ApiFailure> {
    let (Some(email), Some(password)) = body
        .map(|Json(req)| (req.email, req.password))
        .unwrap_or((None, None))
    else {
        return Err(ApiFailure::bad_request("Incomplete values"));
    };

    let user = state
        .db
        .find_user_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {:?}", e);
            ApiFailure::internal("Internal server error")
        })?
        .ok_or_else(|| ApiFailure::not_found("User doesn't exist"))?;

    if !password_matches(&user, &password) {
        return Err(ApiFailure::bad_request("Incorrect password"));
    }

    let claims = UnprotectedClaims::for_user(user, Duration::hours(TOKEN_TTL_HOURS));
    let token = token::sign(&claims, UNPROTECTED_SECRET).map_err(|e| {
        error!("Failed to sign unprotected token: {}", e);
        ApiFailure::internal("Internal server error")
    })?;

    let cookies = AppendHeaders([(
        header::SET_COOKIE,
        set_cookie(
            UNPROTECTED_COOKIE,
            &token,
            Duration::hours(TOKEN_TTL_HOURS).num_seconds(),
        ),
    )]);

    Ok((cookies, response::success_message("Unprotected Logged in")).into_response())
}

/// GET /api/sessions/unprotectedCurrent - Decode the demo token
#[utoipa::path(
    get,
    path = "/api/sessions/unprotectedCurrent",
    responses(
        (status = 200, description = "Decoded token claims (insecure)"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn unprotected_current_handler(headers: HeaderMap) -> Result<Response, ApiFailure> {
    let raw = cookie_value(&headers, UNPROTECTED_COOKIE)
        .ok_or_else(|| ApiFailure::unauthorized("Invalid token"))?;

    let claims: UnprotectedClaims = token::verify(raw, UNPROTECTED_SECRET).map_err(|e| {
        error!("Unprotected token verification failed: {}", e);
        ApiFailure::unauthorized("Invalid token")
    })?;

    Ok(response::success(claims))
}
