// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, Request, Response},
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::{
    handlers::{auth, friends, users},
    state::AppState,
    utils::session::{require_auth, session_middleware},
};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Assembles the main application router.
///
/// * Public routes: signup, login, logout, listings and profiles.
/// * Private routes: everything that acts on behalf of the session user.
/// * Global middleware: request id, trace, CORS, session decoding.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/", get(users::list_top_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/friends", get(friends::list_friends));

    let private_routes = Router::new()
        .route("/users/{id}/edit", post(users::edit_user))
        .route("/users/{id}/requests", get(friends::list_requests))
        .route("/users/{id}/friend_request", post(friends::send_friend_request))
        .route(
            "/users/{id}/accept_friend_request",
            post(friends::accept_friend_request),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<_>| {
            let request_id = req
                .headers()
                .get(&REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %request_id,
            )
        })
        .on_response(|res: &Response<_>, latency: Duration, _span: &Span| {
            let status = res.status();
            if status.is_server_error() {
                tracing::error!(%status, ?latency, "completed");
            } else {
                tracing::info!(%status, ?latency, "completed");
            }
        });

    Router::new()
        .merge(public_routes)
        .merge(private_routes)
        // Session decoding runs before the per-route auth gate.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        // Global Middleware (first listed is outermost)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    REQUEST_ID_HEADER.clone(),
                    MakeRequestUuid,
                ))
                .layer(trace)
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER.clone()))
                .layer(cors),
        )
        .with_state(state)
}
