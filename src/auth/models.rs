//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::users::models::UserSummary;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Internal user id
    pub sub: String,
    pub email: String,
    pub google_id: Option<String>,
    /// Session id, the revocation key
    pub jti: String,
    pub exp: usize,
}

/// Body for `POST /auth/google`
#[derive(Debug, Default, Deserialize)]
pub struct GoogleAuthRequest {
    pub credential: Option<String>,
}

/// Response for `POST /auth/google`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub is_registered: bool,
    pub c_tags: Vec<String>,
    pub user: UserSummary,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Response for `GET /auth/session`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserSummary,
    pub c_tags: Vec<String>,
    pub expires_at: DateTime<Utc>,
}
