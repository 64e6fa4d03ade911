//! Auth routes — registration, password login, session management, WS tickets.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::services::auth::{self as auth_svc, AuthError, MIN_PASSWORD_LEN};
use crate::services::session;
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Per-field validation messages for the credential form. Empty means valid.
pub(crate) fn credential_field_errors(email: &str, password: &str) -> serde_json::Map<String, serde_json::Value> {
    let mut errors = serde_json::Map::new();
    if auth_svc::normalize_email(email).is_none() {
        errors.insert("email".into(), json!("invalid email"));
    }
    if !auth_svc::password_long_enough(password) {
        errors.insert("password".into(), json!(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    errors
}

fn auth_error_response(err: &AuthError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        AuthError::InvalidEmail | AuthError::PasswordTooShort => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Hash(_) | AuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Open a session for `user_id`: mint the token, set the cookie, return the user.
async fn open_session(
    state: &AppState,
    user_id: uuid::Uuid,
) -> Result<(CookieJar, Json<session::SessionUser>), (StatusCode, Json<serde_json::Value>)> {
    let token = session::create_session(&state.pool, user_id).await.map_err(|e| {
        tracing::error!(error = %e, "session creation failed");
        auth_error_response(&AuthError::Db(e))
    })?;

    let user = session::validate_session(&state.pool, &token)
        .await
        .map_err(|e| auth_error_response(&AuthError::Db(e)))?
        .ok_or_else(|| {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "session lookup failed" })))
        })?;

    let jar = CookieJar::new().add(session_cookie(token));
    Ok((jar, Json(user)))
}

/// `POST /api/auth/register` — create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, CookieJar, Json<session::SessionUser>), (StatusCode, Json<serde_json::Value>)> {
    let errors = credential_field_errors(&body.email, &body.password);
    if !errors.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))));
    }

    let user_id = auth_svc::register_user(&state.pool, &body.email, &body.password, body.name.as_deref())
        .await
        .map_err(|e| auth_error_response(&e))?;

    tracing::info!(%user_id, "account registered");
    let (jar, user) = open_session(&state, user_id).await?;
    Ok((StatusCode::CREATED, jar, user))
}

/// `POST /api/auth/login` — verify credentials, set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<session::SessionUser>), (StatusCode, Json<serde_json::Value>)> {
    // Field validation happens before any credential check, mirroring the
    // login form: a malformed submission never reaches the database.
    let errors = credential_field_errors(&body.email, &body.password);
    if !errors.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))));
    }

    let user_id = auth_svc::authenticate(&state.pool, &body.email, &body.password)
        .await
        .map_err(|e| auth_error_response(&e))?;

    tracing::info!(%user_id, "login succeeded");
    open_session(&state, user_id).await
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state.pool, &auth.token).await;

    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

/// `POST /api/auth/ws-ticket` — create a one-time WS ticket.
pub async fn ws_ticket(State(state): State<AppState>, auth: AuthUser) -> Result<Json<serde_json::Value>, StatusCode> {
    let ticket = session::create_ws_ticket(&state.pool, auth.user.id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(json!({ "ticket": ticket })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
