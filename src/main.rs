// src/main.rs
use dotenv::dotenv;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use ctag_api::app::build_router;
use ctag_api::auth::session::SessionManager;
use ctag_api::common::{config::AppConfig, AppState};
use ctag_api::services::{monitoring, GoogleTokenVerifier};
use ctag_api::store;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    monitoring::init_tracing();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    let _sentry = monitoring::init_sentry(config.sentry_dsn.as_deref());

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let table_store = store::connect(&config.store, config.reset_db, http_client.clone()).await?;
    info!(store = config.store.kind(), "Table store initialized");

    let verifier = Arc::new(GoogleTokenVerifier::new(
        http_client,
        config.google_client_id.clone(),
    ));
    info!("GoogleTokenVerifier initialized");

    let sessions = SessionManager::new(&config.jwt_secret, config.session_ttl_hours);

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState::new(table_store, verifier, sessions));
    let app = build_router(state, &config.cors_origins);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
