//! Authentication handlers

use axum::extract::{rejection::JsonRejection, Extension, Json};
use std::sync::Arc;
use tracing::{info, warn};

use super::extractors::AuthedSession;
use super::models::{GoogleAuthRequest, LoginResponse, SessionResponse};
use super::services::AuthService;
use super::session;
use crate::common::{ApiError, AppState};
use crate::ctags::services::CTagService;
use crate::users::models::UserSummary;
use crate::users::services::UsersService;

/// POST /auth/google
/// Authenticates a user via a Google ID token
///
/// # Request Body
/// ```json
/// { "credential": "<google id token>" }
/// ```
///
/// # Response
/// ```json
/// {
///   "isRegistered": true,
///   "cTags": ["ctag_k7np3x2ab"],
///   "user": { "id": "U_K7NP3X", "email": "...", "name": "...", "googleId": "..." },
///   "token": "<session jwt>",
///   "expiresAt": "2024-01-02T00:00:00Z"
/// }
/// ```
pub async fn google_auth(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("🔐 Received Google auth request");
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = AuthService::new(&state)
        .authenticate_with_google(request.credential.as_deref().unwrap_or_default())
        .await?;

    let issued = state.sessions.issue(&outcome.user)?;

    Ok(Json(LoginResponse {
        is_registered: true,
        c_tags: outcome.c_tags,
        user: UserSummary::from(&outcome.user),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// GET /auth/session
/// Returns the signed-in user and their current CTags
pub async fn session_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedSession,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = UsersService::new(state.store.clone())
        .find_by_email(&authed.claims.email)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %authed.user_id(), "Session refers to a missing user");
            ApiError::Unauthorized("user not found".to_string())
        })?;

    let c_tags = match authed.google_id() {
        Some(google_id) => {
            CTagService::new(state.store.clone())
                .list_for_owner(google_id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(SessionResponse {
        user: UserSummary::from(&user),
        c_tags,
        expires_at: session::expires_at(&authed.claims),
    }))
}

/// POST /auth/logout
/// Revokes the presented session token
pub async fn logout_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.sessions.revoke(&authed.claims).await;
    info!(user_id = %authed.user_id(), "User logout successful");

    Ok(Json(serde_json::json!({
        "message": "Logout successful"
    })))
}
