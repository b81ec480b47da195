use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the CTag router
pub fn ctags_routes() -> Router {
    Router::new()
        // Registration
        .route("/api/ctags/register", post(handlers::register_ctag))
        .route("/api/ctags/auto-register", post(handlers::auto_register_ctag))
        .route("/api/ctags/auto-create-ns", post(handlers::create_ns_ctag))
        // Lookups
        .route("/api/ctags/check/:google_id", get(handlers::check_registration))
        .route("/api/ctags/user-ctags/:user_id", get(handlers::list_user_ctags))
        .route("/api/ctags/:tag_id", get(handlers::get_ctag))
        // Linked accounts (session required)
        .route("/api/ctags/:tag_id/wallets", post(handlers::link_wallet))
        .route("/api/ctags/:tag_id/accounts", post(handlers::link_account))
}
