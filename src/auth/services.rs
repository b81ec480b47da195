//! Google sign-in flow

use std::sync::Arc;
use tracing::info;

use crate::common::{safe_email_log, ApiError, AppState};
use crate::ctags::services::CTagService;
use crate::services::google::IdentityVerifier;
use crate::users::models::User;
use crate::users::services::UsersService;

/// Result of a successful sign-in, before a session is issued
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub c_tags: Vec<String>,
}

pub struct AuthService {
    verifier: Arc<dyn IdentityVerifier>,
    users: UsersService,
    ctags: CTagService,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            verifier: state.verifier.clone(),
            users: UsersService::new(state.store.clone()),
            ctags: CTagService::new(state.store.clone()),
        }
    }

    /// Verify the credential, store the user, and resolve (or provision) their CTags
    ///
    /// Writes at most one user row and one CTag row.
    pub async fn authenticate_with_google(&self, credential: &str) -> Result<LoginOutcome, ApiError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ApiError::ValidationError(
                "credential: Credential is required".to_string(),
            ));
        }

        let identity = self.verifier.verify(credential).await?;
        let user = self.users.ensure_for_identity(&identity).await?;
        let c_tags = self
            .ctags
            .ensure_for_identity(&identity.subject_id, &user.email)
            .await?;

        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            tag_count = c_tags.len(),
            provider = "google",
            "User authentication successful via Google"
        );

        Ok(LoginOutcome { user, c_tags })
    }
}
