//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Session token issue, validation and revocation
//! - Google sign-in with CTag auto-provisioning
//! - The session and logout endpoints

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{test_app, FakeVerifier};
    use crate::common::ApiError;
    use crate::users::models::User;
    use axum::http::{Method, StatusCode};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;
    use super::super::session::SessionManager;

    fn user() -> User {
        User {
            id: "U_K7NP3X".to_string(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            google_id: Some("g-1".to_string()),
            created_at: None,
        }
    }

    // ============================================================================
    // Session tokens
    // ============================================================================

    #[tokio::test]
    async fn test_issue_and_validate_session() {
        let sessions = SessionManager::new("test_secret_key", 24);
        let issued = sessions.issue(&user()).unwrap();

        let claims = sessions.validate(&issued.token).await.unwrap();
        assert_eq!(claims.sub, "U_K7NP3X");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.google_id.as_deref(), Some("g-1"));
        assert!(claims.jti.starts_with("K_"));
        assert_eq!(session::expires_at(&claims).timestamp(), issued.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_ids() {
        let sessions = SessionManager::new("test_secret_key", 24);
        let a = sessions.validate(&sessions.issue(&user()).unwrap().token).await.unwrap();
        let b = sessions.validate(&sessions.issue(&user()).unwrap().token).await.unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[tokio::test]
    async fn test_revoked_session_is_rejected() {
        let sessions = SessionManager::new("test_secret_key", 24);
        let keep = sessions.issue(&user()).unwrap();
        let dropped = sessions.issue(&user()).unwrap();

        let claims = sessions.validate(&dropped.token).await.unwrap();
        sessions.revoke(&claims).await;

        let err = sessions.validate(&dropped.token).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(sessions.validate(&keep.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let issuer = SessionManager::new("test_secret_key", 24);
        let verifier = SessionManager::new("another_secret", 24);
        let issued = issuer.issue(&user()).unwrap();

        let err = verifier.validate(&issued.token).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_out_of_range_lifetime_fails_cleanly() {
        for hours in [10_000_000_000, i64::MAX] {
            let sessions = SessionManager::new("test_secret_key", hours);
            match sessions.issue(&user()) {
                Err(ApiError::InternalServer(_)) => {}
                other => panic!("expected internal error for {} hours, got {:?}", hours, other),
            }
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let claims = models::Claims {
            sub: "U_K7NP3X".to_string(),
            email: "ada@example.com".to_string(),
            google_id: Some("g-1".to_string()),
            jti: "K_EXPIREDTOKEN".to_string(),
            exp: (chrono::Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();

        let sessions = SessionManager::new("test_secret_key", 24);
        assert!(sessions.validate(&token).await.is_err());
    }

    // ============================================================================
    // Google sign-in
    // ============================================================================

    #[tokio::test]
    async fn test_google_login_provisions_user_and_tag() {
        let app = test_app(FakeVerifier::default().with("good-token", "Ada@Example.com", "g-1")).await;

        let (status, body) = app
            .post("/auth/google", json!({ "credential": "good-token" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isRegistered"], true);
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["googleId"], "g-1");
        assert!(body["token"].as_str().unwrap().len() > 20);
        let tags = body["cTags"].as_array().unwrap();
        assert_eq!(tags.len(), 1);
        assert!(tags[0].as_str().unwrap().starts_with("ctag_"));

        // A second login reuses the user and the tag
        let (status, again) = app
            .post("/auth/google", json!({ "credential": "good-token" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["user"]["id"], body["user"]["id"]);
        assert_eq!(again["cTags"], body["cTags"]);
    }

    #[tokio::test]
    async fn test_google_login_rejects_bad_credentials() {
        let app = test_app(FakeVerifier::default()).await;

        let (status, body) = app
            .post("/auth/google", json!({ "credential": "forged" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = app.post("/auth/google", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Nothing was written for the rejected attempts
        let (_, check) = app.get("/api/ctags/check/g-1").await;
        assert_eq!(check["registered"], false);
    }

    #[tokio::test]
    async fn test_session_then_logout() {
        let app = test_app(FakeVerifier::default().with("good-token", "ada@example.com", "g-1")).await;
        let (_, login) = app
            .post("/auth/google", json!({ "credential": "good-token" }))
            .await;
        let token = login["token"].as_str().unwrap().to_string();

        let (status, session) = app
            .send(Method::GET, "/auth/session", None, Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["user"]["email"], "ada@example.com");
        assert_eq!(session["cTags"], login["cTags"]);

        let (status, body) = app
            .send(Method::POST, "/auth/logout", None, Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");

        let (status, _) = app
            .send(Method::GET, "/auth/session", None, Some(&token))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_requires_token() {
        let app = test_app(FakeVerifier::default()).await;

        let (status, _) = app.get("/auth/session").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send(Method::GET, "/auth/session", None, Some("not-a-jwt"))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(FakeVerifier::default()).await;
        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
