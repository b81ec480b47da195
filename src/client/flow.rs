//! Client-side session flow
//!
//! `LoggedOut -> CTagPending -> (CTagSelectionNeeded ->) Ready`, with logout
//! returning to `LoggedOut` from anywhere. An expired session is treated as a
//! logout before any other transition runs.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{info, warn};

use super::api::{CTagApi, ClientError};
use crate::users::models::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    /// Logged in, tag list not yet resolved
    CTagPending,
    /// The user has to pick a tag, or provisioning failed
    CTagSelectionNeeded,
    /// A tag is selected
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::LoggedOut => "logged out",
            SessionState::CTagPending => "waiting for tags",
            SessionState::CTagSelectionNeeded => "selecting a tag",
            SessionState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Identity held by the client for the lifetime of a login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserSummary,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionFlow<A: CTagApi> {
    api: A,
    state: SessionState,
    session: Option<Session>,
    tags: Vec<String>,
    selected: Option<String>,
    new_tag_notice: Option<String>,
    error_notice: Option<String>,
}

impl<A: CTagApi> SessionFlow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: SessionState::LoggedOut,
            session: None,
            tags: Vec::new(),
            selected: None,
            new_tag_notice: None,
            error_notice: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Set when a tag was created for this login
    pub fn new_tag_notice(&self) -> Option<&str> {
        self.new_tag_notice.as_deref()
    }

    pub fn error_notice(&self) -> Option<&str> {
        self.error_notice.as_deref()
    }

    fn clear(&mut self) {
        self.state = SessionState::LoggedOut;
        self.session = None;
        self.tags.clear();
        self.selected = None;
        self.new_tag_notice = None;
        self.error_notice = None;
    }

    fn expire_if_needed(&mut self) {
        let expired = self
            .session
            .as_ref()
            .map_or(false, |session| session.is_expired(Utc::now()));
        if expired {
            info!("Client session expired, logging out");
            self.clear();
        }
    }

    fn invalid(&self, action: &'static str) -> ClientError {
        ClientError::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
    }

    /// Exchange a Google credential for a session and the login-time tag list
    pub async fn login(&mut self, credential: &str) -> Result<(), ClientError> {
        self.expire_if_needed();
        if self.state != SessionState::LoggedOut {
            return Err(self.invalid("log in"));
        }

        match self.api.login(credential).await {
            Ok(response) => {
                self.session = Some(Session {
                    user: response.user,
                    token: response.token,
                    expires_at: response.expires_at,
                });
                self.tags = response.c_tags;
                self.error_notice = None;
                self.state = SessionState::CTagPending;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.error_notice = Some("Login failed. Please try again.".to_string());
                Err(e)
            }
        }
    }

    /// Select the first known tag, or register one when there are none
    pub async fn resolve_tags(&mut self) -> Result<(), ClientError> {
        self.expire_if_needed();
        if self.state != SessionState::CTagPending {
            return Err(self.invalid("resolve tags"));
        }

        if let Some(first) = self.tags.first() {
            self.selected = Some(first.clone());
            self.state = SessionState::Ready;
            return Ok(());
        }

        self.state = SessionState::CTagSelectionNeeded;
        let session = self.session.as_ref().ok_or(ClientError::NotLoggedIn)?;
        let google_id = session
            .user
            .google_id
            .clone()
            .ok_or(ClientError::MissingIdentity)?;
        let email = session.user.email.clone();

        match self.api.register_ctag(&google_id, &email).await {
            Ok(ctag) => {
                info!(tag_id = %ctag.tag_id, "New CTag created for this login");
                self.tags = vec![ctag.tag_id.clone()];
                self.selected = Some(ctag.tag_id.clone());
                self.new_tag_notice = Some(ctag.tag_id);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Registering a CTag failed");
                self.error_notice = Some("Could not create a CTag. Please try again.".to_string());
                Err(e)
            }
        }
    }

    /// Re-fetch the owner's tags in the background; failures leave state untouched
    pub async fn refresh_tags(&mut self) {
        self.expire_if_needed();
        let Some(google_id) = self
            .session
            .as_ref()
            .and_then(|session| session.user.google_id.clone())
        else {
            return;
        };

        match self.api.user_ctags(&google_id).await {
            Ok(tags) => {
                let selection_gone = self
                    .selected
                    .as_ref()
                    .map_or(false, |selected| !tags.contains(selected));
                self.tags = tags;
                if self.state == SessionState::Ready && selection_gone {
                    match self.tags.first() {
                        Some(first) => self.selected = Some(first.clone()),
                        None => {
                            self.selected = None;
                            self.state = SessionState::CTagSelectionNeeded;
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "Error checking user CTags"),
        }
    }

    /// Explicitly choose one of the known tags
    pub fn select(&mut self, tag_id: &str) -> Result<(), ClientError> {
        self.expire_if_needed();
        if !matches!(
            self.state,
            SessionState::CTagSelectionNeeded | SessionState::Ready
        ) {
            return Err(self.invalid("select a tag"));
        }
        if !self.tags.iter().any(|tag| tag == tag_id) {
            return Err(ClientError::UnknownTag(tag_id.to_string()));
        }
        self.selected = Some(tag_id.to_string());
        self.error_notice = None;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Drop all client-held identity and tag state; the server logout is best effort
    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            if !session.is_expired(Utc::now()) {
                if let Err(e) = self.api.logout(&session.token).await {
                    warn!(error = %e, "Server-side logout failed");
                }
            }
        }
        self.clear();
    }
}
