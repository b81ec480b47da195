//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::Claims;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated session extractor
///
/// Reads the bearer token from the Authorization header and validates it
/// against the session manager, including the revocation list.
#[derive(Debug, Clone)]
pub struct AuthedSession {
    pub claims: Claims,
}

impl AuthedSession {
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn google_id(&self) -> Option<&str> {
        self.claims.google_id.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        {
            Some(t) => t.to_string(),
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(&token).trim();

        let claims = app_state.sessions.validate(bare_token).await?;
        debug!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "Session authenticated"
        );

        Ok(AuthedSession { claims })
    }
}
