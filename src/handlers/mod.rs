// src/handlers/mod.rs

pub mod auth;
pub mod friends;
pub mod users;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// 302 Found redirect, used by the form flows.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
