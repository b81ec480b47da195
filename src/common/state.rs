// Application state shared across all modules

use std::sync::Arc;

use crate::auth::session::SessionManager;
use crate::services::google::IdentityVerifier;
use crate::store::TableStore;

/// Injected dependencies, built once at startup and shared as `Arc<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TableStore>,
        verifier: Arc<dyn IdentityVerifier>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            store,
            verifier,
            sessions: Arc::new(sessions),
        }
    }
}
