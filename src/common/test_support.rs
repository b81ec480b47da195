//! Shared fixtures for module tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::build_router;
use crate::auth::session::SessionManager;
use crate::common::AppState;
use crate::services::google::{IdentityVerifier, VerifiedIdentity, VerifyError};
use crate::store::sqlite::tests::memory_store;

/// Accepts a fixed set of credentials, each mapping to one identity
#[derive(Default)]
pub struct FakeVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl FakeVerifier {
    pub fn with(mut self, credential: &str, email: &str, subject_id: &str) -> Self {
        self.identities.insert(
            credential.to_string(),
            VerifiedIdentity {
                email: email.to_string(),
                name: Some("Test User".to_string()),
                subject_id: subject_id.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError> {
        self.identities
            .get(credential)
            .cloned()
            .ok_or(VerifyError::Malformed)
    }
}

pub struct TestApp {
    pub router: Router,
}

pub async fn test_app(verifier: FakeVerifier) -> TestApp {
    let state = Arc::new(AppState::new(
        Arc::new(memory_store().await),
        Arc::new(verifier),
        SessionManager::new("test_secret_key", 24),
    ));
    TestApp {
        router: build_router(state, &["http://localhost:3000".to_string()]),
    }
}

impl TestApp {
    /// Send a request and decode the JSON response (Null for empty bodies)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }
}
