// src/services/google.rs
//! Google ID token verification
//!
//! Tokens are checked against Google's `tokeninfo` endpoint
//! (https://developers.google.com/identity/sign-in/web/backend-auth): the
//! response must carry our client id as audience, an unexpired `exp`, and
//! both `email` and `sub`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::common::{safe_email_log, safe_token_log};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("OAuth client not configured")]
    NotConfigured,

    #[error("invalid or malformed id token")]
    Malformed,

    #[error("id token has expired")]
    Expired,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("token missing required fields")]
    MissingClaims,

    #[error("token verification service unavailable: {0}")]
    Transport(String),
}

/// Identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub subject_id: String,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError>;
}

/// Fields of the tokeninfo response we rely on; tokeninfo encodes numbers as strings
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub aud: Option<String>,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub email_verified: Option<serde_json::Value>,
    pub exp: Option<serde_json::Value>,
}

fn as_i64(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn as_bool(value: &serde_json::Value) -> Option<bool> {
    value
        .as_bool()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

impl TokenInfo {
    /// Check audience and expiry, then pull out the identity
    pub fn into_identity(
        self,
        client_id: &str,
        now: i64,
    ) -> Result<VerifiedIdentity, VerifyError> {
        match self.aud.as_deref() {
            Some(aud) if aud == client_id => {
                debug!(token_audience = %aud, "Google token audience validation successful");
            }
            Some(aud) => {
                warn!(
                    token_audience = %aud,
                    expected_client_id = %client_id,
                    "Google token audience validation failed - rejecting token"
                );
                return Err(VerifyError::AudienceMismatch);
            }
            None => {
                warn!("Google token missing audience field - rejecting token");
                return Err(VerifyError::AudienceMismatch);
            }
        }

        if let Some(exp) = self.exp.as_ref().and_then(as_i64) {
            if exp < now {
                warn!(token_exp = exp, current_time = now, "Google token has expired");
                return Err(VerifyError::Expired);
            }
        }

        if let Some(false) = self.email_verified.as_ref().and_then(as_bool) {
            warn!("Google token contains unverified email address");
        }

        match (self.email, self.sub) {
            (Some(email), Some(sub)) if !email.is_empty() && !sub.is_empty() => {
                Ok(VerifiedIdentity {
                    email,
                    name: self.name,
                    subject_id: sub,
                })
            }
            (email, sub) => {
                warn!(
                    has_email = email.is_some(),
                    has_sub = sub.is_some(),
                    "Google token missing required fields (email/sub)"
                );
                Err(VerifyError::MissingClaims)
            }
        }
    }
}

/// Verifies ID tokens through Google's tokeninfo endpoint
pub struct GoogleTokenVerifier {
    http: Client,
    client_id: Option<String>,
    tokeninfo_url: String,
}

impl GoogleTokenVerifier {
    pub fn new(http: Client, client_id: Option<String>) -> Self {
        Self {
            http,
            client_id,
            tokeninfo_url: TOKENINFO_URL.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError> {
        let client_id = self.client_id.as_deref().ok_or(VerifyError::NotConfigured)?;

        debug!(
            credential = %safe_token_log(credential),
            "Initiating Google token validation with tokeninfo endpoint"
        );
        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    endpoint = %self.tokeninfo_url,
                    "HTTP error contacting Google tokeninfo endpoint"
                );
                VerifyError::Transport(e.to_string())
            })?;

        let status = response.status();
        debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

        if status.is_client_error() {
            warn!(http_status = %status, "Google tokeninfo rejected the token");
            return Err(VerifyError::Malformed);
        }
        if !status.is_success() {
            warn!(http_status = %status, "Google tokeninfo returned error status");
            return Err(VerifyError::Transport(format!("tokeninfo returned {}", status)));
        }

        let info = response.json::<TokenInfo>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google tokeninfo JSON response");
            VerifyError::Malformed
        })?;

        let identity = info.into_identity(client_id, Utc::now().timestamp())?;
        debug!(
            email = %safe_email_log(&identity.email),
            provider_id = %identity.subject_id,
            "Google token validation successful"
        );
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_info(value: serde_json::Value) -> TokenInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_token_info() {
        let info = token_info(json!({
            "aud": "client-1",
            "sub": "1234567890",
            "email": "a@x.com",
            "name": "Ada",
            "email_verified": "true",
            "exp": "2000000000"
        }));

        let identity = info.into_identity("client-1", 1_700_000_000).unwrap();
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.subject_id, "1234567890");
        assert_eq!(identity.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_audience_mismatch() {
        let info = token_info(json!({"aud": "other", "sub": "1", "email": "a@x.com"}));
        assert!(matches!(
            info.into_identity("client-1", 0),
            Err(VerifyError::AudienceMismatch)
        ));

        let info = token_info(json!({"sub": "1", "email": "a@x.com"}));
        assert!(matches!(
            info.into_identity("client-1", 0),
            Err(VerifyError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_expired_token() {
        let info = token_info(json!({
            "aud": "client-1", "sub": "1", "email": "a@x.com", "exp": 100
        }));
        assert!(matches!(
            info.into_identity("client-1", 200),
            Err(VerifyError::Expired)
        ));
    }

    #[test]
    fn test_missing_claims() {
        let info = token_info(json!({"aud": "client-1", "email": "a@x.com"}));
        assert!(matches!(
            info.into_identity("client-1", 0),
            Err(VerifyError::MissingClaims)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_client_id() {
        let verifier = GoogleTokenVerifier::new(Client::new(), None);
        assert!(matches!(
            verifier.verify("token").await,
            Err(VerifyError::NotConfigured)
        ));
    }
}
