// src/handlers/auth.rs

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::found,
    models::user::{LoginForm, SignupForm, User, parse_age},
    store::{StoreError, UserRepository},
    utils::{
        hash::verify_password,
        html::clean_html,
        session::{clear_session_cookie_header, session_cookie_header, sign_session},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Redirects to the login page on success.
pub async fn signup(
    State(repo): State<UserRepository>,
    Form(payload): Form<SignupForm>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let age = parse_age(&payload.age).map_err(AppError::BadRequest)?;

    let mut user = User {
        email: payload.email.trim().to_string(),
        password: payload.password,
        name: clean_html(&payload.name),
        surname: clean_html(&payload.surname),
        age,
        sex: clean_html(&payload.sex),
        interests: clean_html(&payload.interests),
        city: clean_html(&payload.city),
        ..Default::default()
    };

    let id = repo.create_user(&mut user).await?;
    tracing::info!(user_id = id, "user signed up");

    Ok(found("/login"))
}

/// Authenticates a user and starts a session.
///
/// Verifies the email and password against the database. If valid, sets the
/// signed session cookie and redirects to the user's page.
pub async fn login(
    State(repo): State<UserRepository>,
    State(config): State<Config>,
    Form(payload): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::AuthError("Incorrect email or password".to_string());

    if payload.validate().is_err() {
        return Err(invalid());
    }

    let user = match repo.find_user_by_email(payload.email.trim()).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };

    let is_valid = verify_password(&payload.password, &user.encrypted_password).unwrap_or_else(|e| {
        tracing::warn!(user_id = user.id, "stored password hash is unusable: {}", e);
        false
    });

    if !is_valid {
        return Err(invalid());
    }

    let token = sign_session(user.id, &config.session_key, config.session_ttl)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie_header(&token, &config)?);

    tracing::info!(user_id = user.id, "user logged in");

    Ok((headers, found(&format!("/users/{}", user.id))))
}

/// Ends the current session.
pub async fn logout() -> Result<impl IntoResponse, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear_session_cookie_header()?);

    Ok((headers, found("/login")))
}
