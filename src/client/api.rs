//! HTTP client for the CTag API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::auth::models::LoginResponse;
use crate::ctags::models::{CTag, CTagCreatedResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("signed-in user has no Google identity")]
    MissingIdentity,

    #[error("unknown CTag: {0}")]
    UnknownTag(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },
}

/// Calls the session flow makes against the backend
#[async_trait]
pub trait CTagApi: Send + Sync {
    async fn login(&self, credential: &str) -> Result<LoginResponse, ClientError>;

    async fn register_ctag(&self, google_id: &str, email: &str) -> Result<CTag, ClientError>;

    async fn user_ctags(&self, google_id: &str) -> Result<Vec<String>, ClientError>;

    async fn logout(&self, token: &str) -> Result<(), ClientError>;
}

pub struct HttpCTagApi {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpCTagApi {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map non-2xx responses to `ClientError::Api` using the server's message
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    Err(ClientError::Api { status, message })
}

#[async_trait]
impl CTagApi for HttpCTagApi {
    async fn login(&self, credential: &str) -> Result<LoginResponse, ClientError> {
        debug!("Posting credential to /auth/google");
        let response = self
            .http
            .post(self.url("/auth/google"))
            .json(&serde_json::json!({ "credential": credential }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn register_ctag(&self, google_id: &str, email: &str) -> Result<CTag, ClientError> {
        let response = self
            .http
            .post(self.url("/api/ctags/register"))
            .json(&serde_json::json!({ "googleId": google_id, "email": email }))
            .send()
            .await?;
        let created: CTagCreatedResponse = check(response).await?.json().await?;
        Ok(created.c_tag)
    }

    async fn user_ctags(&self, google_id: &str) -> Result<Vec<String>, ClientError> {
        let path = format!("/api/ctags/user-ctags/{}", urlencoding::encode(google_id));
        let response = self.http.get(self.url(&path)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = HttpCTagApi::new(Client::new(), "http://localhost:5001/");
        assert_eq!(api.url("/auth/google"), "http://localhost:5001/auth/google");
    }
}
