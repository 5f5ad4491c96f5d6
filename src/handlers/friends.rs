// src/handlers/friends.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError, handlers::found, store::UserRepository, utils::session::CurrentUser,
};

/// Accepted friends of a user.
pub async fn list_friends(
    State(repo): State<UserRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    repo.find_user_by_id(id).await?;

    let friends = repo.list_friends(id).await?;

    Ok(Json(friends))
}

/// Pending friendships of the current user.
///
/// Both rows of a pending pair look the same, so the list holds requests the
/// user sent as well as those they received.
pub async fn list_requests(
    State(repo): State<UserRepository>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if current.id != id {
        return Err(AppError::Forbidden(
            "Friend requests are only visible to their owner".to_string(),
        ));
    }

    let requests = repo.list_pending_requests(id).await?;

    Ok(Json(requests))
}

/// Sends a friend request from the current user to user `id`.
pub async fn send_friend_request(
    State(repo): State<UserRepository>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    repo.send_friend_request(current.id, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "from": current.id, "to": id, "status": "pending" })),
    ))
}

/// Accepts the pending friendship between user `id` and the current user.
///
/// Either side of a pending pair may accept it, including the sender.
pub async fn accept_friend_request(
    State(repo): State<UserRepository>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    repo.accept_friend_request(id, current.id).await?;

    Ok(found(&format!("/users/{}", current.id)))
}
