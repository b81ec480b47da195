//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/google` - Google ID token sign-in
/// - `GET /auth/session` - Current session's user and CTags
/// - `POST /auth/logout` - Revoke the current session
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google", post(handlers::google_auth))
        .route("/auth/session", get(handlers::session_handler))
        .route("/auth/logout", post(handlers::logout_handler))
}
