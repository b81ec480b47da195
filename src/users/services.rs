use std::sync::Arc;
use tracing::{debug, info};

use super::models::{NewUser, User};
use crate::common::helpers::normalize_email;
use crate::common::{safe_email_log, ApiError, ValidationResult};
use crate::services::google::VerifiedIdentity;
use crate::store::TableStore;

pub struct UsersService {
    store: Arc<dyn TableStore>,
}

impl UsersService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.store.find_user_by_email(&normalize_email(email)).await?)
    }

    /// Upsert a user by email without touching CTags (`POST /register-ctag`)
    pub async fn register(&self, email: Option<&str>, name: Option<&str>) -> Result<User, ApiError> {
        let mut validation = ValidationResult::new();
        validation.require("email", email, "Email is required");
        validation.into_result()?;

        let email = normalize_email(email.unwrap_or_default());
        let user = self
            .store
            .upsert_user(&NewUser {
                email,
                name: name
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                google_id: None,
            })
            .await?;

        info!(user_id = %user.id, email = %safe_email_log(&user.email), "User registered");
        Ok(user)
    }

    /// The user for a verified identity, created on first sight
    ///
    /// An existing row without a linked Google subject gets it filled in.
    pub async fn ensure_for_identity(&self, identity: &VerifiedIdentity) -> Result<User, ApiError> {
        let email = normalize_email(&identity.email);

        if let Some(user) = self.store.find_user_by_email(&email).await? {
            if user.google_id.is_some() {
                debug!(user_id = %user.id, "Found existing user for identity");
                return Ok(user);
            }
        }

        let user = self
            .store
            .upsert_user(&NewUser {
                email,
                name: identity.name.clone(),
                google_id: Some(identity.subject_id.clone()),
            })
            .await?;

        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            provider = "google",
            "User account stored via Google sign-in"
        );
        Ok(user)
    }
}
