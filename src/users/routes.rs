use axum::{routing::post, Router};

use super::handlers;

/// Creates the users router
///
/// # Routes
/// - `POST /register-ctag` - Upsert a user by email
pub fn users_routes() -> Router {
    Router::new().route("/register-ctag", post(handlers::register_user))
}
