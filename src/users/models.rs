//! User data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub google_id: Option<String>,
    pub created_at: Option<String>,
}

/// Fields written by an upsert keyed on email
///
/// `None` values leave the existing column untouched on conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub google_id: Option<String>,
}

/// Body for `POST /register-ctag`
#[derive(Debug, Default, Deserialize)]
pub struct RegisterUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Public view of a user returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub google_id: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            google_id: user.google_id.clone(),
        }
    }
}
