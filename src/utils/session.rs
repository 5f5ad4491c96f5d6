// src/utils/session.rs

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, SESSION_COOKIE},
    error::AppError,
    models::user::User,
    state::AppState,
    store::StoreError,
};

/// Claims carried by the signed session cookie.
#[derive(Debug, Deserialize, Serialize, Clone)]
struct SessionClaims {
    /// Subject - the authenticated user id.
    sub: i64,
    /// Expiration time as Unix timestamp.
    exp: usize,
}

/// Session payload attached to every request by `session_middleware`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<i64>,
}

/// The logged-in user, injected by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Signs a session token for `user_id` valid for `ttl_seconds`.
pub fn sign_session(user_id: i64, secret: &str, ttl_seconds: u64) -> Result<String, AppError> {
    let expiry_overflow = || AppError::InternalServerError("session expiry overflow".to_string());

    let ttl = i64::try_from(ttl_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(expiry_overflow)?;

    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(expiry_overflow)?
        .timestamp() as usize;

    let claims = SessionClaims {
        sub: user_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Decodes a session token. Any invalid, expired or tampered token is an anonymous session.
pub fn decode_session(token: &str, secret: &str) -> Session {
    let user_id = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .ok();

    Session { user_id }
}

/// Extracts the session cookie value from the request headers.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value that stores a new session.
pub fn session_cookie_header(token: &str, config: &Config) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, config.session_ttl
    ))
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// `Set-Cookie` value that expires the session.
pub fn clear_session_cookie_header() -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    ))
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Axum Middleware: Session decoding.
///
/// Attaches a `Session` to every request. Requests without a valid cookie
/// get an anonymous session, never an error.
pub async fn session_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = session_cookie(req.headers())
        .map(|token| decode_session(token, &config.session_key))
        .unwrap_or_default();

    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Axum Middleware: Authentication.
///
/// Must be used AFTER `session_middleware`. Resolves the session user and
/// injects `CurrentUser`; returns 401 when there is no valid session or the
/// user no longer exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = req.extensions().get::<Session>().and_then(|s| s.user_id);

    let Some(user_id) = user_id else {
        return AppError::AuthError("Not authenticated".to_string()).into_response();
    };

    match state.repo.find_user_by_id(user_id).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(StoreError::NotFound) => {
            AppError::AuthError("Not authenticated".to_string()).into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}
