//! Session tokens
//!
//! A login issues an HS256 JWT with a fixed lifetime. Logout records the
//! token's `jti` as revoked until the token would have expired anyway.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::Claims;
use crate::common::{generate_session_id, ApiError};
use crate::users::models::User;

pub struct SessionManager {
    jwt_secret: String,
    /// `None` when the configured hours do not fit a `Duration`
    ttl: Option<Duration>,
    /// Revoked token ids mapped to their expiry (unix seconds)
    revoked: RwLock<HashMap<String, usize>>,
}

/// A freshly issued session token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionManager {
    pub fn new(jwt_secret: &str, ttl_hours: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            ttl: Duration::try_hours(ttl_hours),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, user: &User) -> Result<IssuedSession, ApiError> {
        let expires_at = self
            .ttl
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                error!(user_id = %user.id, "Session lifetime overflows the calendar");
                ApiError::InternalServer("session lifetime out of range".to_string())
            })?;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            google_id: user.google_id.clone(),
            jti: generate_session_id(),
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "JWT encoding error during session issue");
            ApiError::InternalServer("jwt error".to_string())
        })?;

        debug!(user_id = %user.id, session_id = %claims.jti, "Session issued");
        Ok(IssuedSession { token, expires_at })
    }

    /// Decode the token and reject it when expired or revoked
    pub async fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!(error = %e, "JWT validation failed");
            ApiError::Unauthorized("invalid token".to_string())
        })?
        .claims;

        if self.revoked.read().await.contains_key(&claims.jti) {
            warn!(session_id = %claims.jti, "Rejected revoked session token");
            return Err(ApiError::Unauthorized("session has been logged out".to_string()));
        }

        Ok(claims)
    }

    /// Invalidate a session; expired revocations are pruned on the way
    pub async fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp() as usize;
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp >= now);
        revoked.insert(claims.jti.clone(), claims.exp);
        debug!(session_id = %claims.jti, active_revocations = revoked.len(), "Session revoked");
    }
}

/// Expiry of a claims set as a timestamp
pub fn expires_at(claims: &Claims) -> DateTime<Utc> {
    Utc.timestamp_opt(claims.exp as i64, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
