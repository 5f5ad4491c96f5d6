// src/handlers/users.rs

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::{MAX_USERS_PER_PAGE, USERS_PER_PAGE},
    error::AppError,
    handlers::found,
    models::user::{EditProfileForm, ProfileResponse, TopUsersParams, User, parse_age},
    store::UserRepository,
    utils::{
        html::clean_html,
        session::{CurrentUser, Session},
    },
};

/// Main page: users ordered by name.
pub async fn list_top_users(
    State(repo): State<UserRepository>,
    Query(params): Query<TopUsersParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(USERS_PER_PAGE)
        .clamp(0, MAX_USERS_PER_PAGE);

    let users = repo.list_top_users(limit).await?;

    Ok(Json(users))
}

/// Public profile of a single user.
/// Logged-in viewers also get their friendship state with this user.
pub async fn get_user(
    State(repo): State<UserRepository>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = repo.find_user_by_id(id).await?;

    let friendship = match session.user_id {
        Some(viewer) if viewer != id => Some(repo.friendship_state(viewer, id).await?),
        _ => None,
    };

    Ok(Json(ProfileResponse { user, friendship }))
}

/// Updates the current user's profile.
/// Only the owner of the page may edit it.
pub async fn edit_user(
    State(repo): State<UserRepository>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(payload): Form<EditProfileForm>,
) -> Result<impl IntoResponse, AppError> {
    if current.id != id {
        return Err(AppError::Forbidden(
            "To edit this profile login as its owner".to_string(),
        ));
    }

    payload.validate()?;

    let age = parse_age(&payload.age).map_err(AppError::BadRequest)?;

    let mut user = User {
        id,
        email: current.email,
        name: clean_html(&payload.name),
        surname: clean_html(&payload.surname),
        age,
        sex: clean_html(&payload.sex),
        interests: clean_html(&payload.interests),
        city: clean_html(&payload.city),
        password: payload.password,
        ..Default::default()
    };

    repo.update_user(&mut user).await?;
    tracing::info!(user_id = id, "profile updated");

    Ok(found(&format!("/users/{}", id)))
}
