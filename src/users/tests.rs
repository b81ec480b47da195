//! Tests for users module

#[cfg(test)]
mod tests {
    use super::super::services::UsersService;
    use crate::common::test_support::{test_app, FakeVerifier};
    use crate::common::ApiError;
    use crate::services::google::VerifiedIdentity;
    use crate::store::sqlite::tests::memory_store;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    async fn service() -> UsersService {
        UsersService::new(Arc::new(memory_store().await))
    }

    fn identity(email: &str, subject_id: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            email: email.to_string(),
            name: Some("Ada".to_string()),
            subject_id: subject_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_upserts_by_email() {
        let service = service().await;
        let first = service.register(Some("Ada@Example.com "), None).await.unwrap();
        assert_eq!(first.email, "ada@example.com");
        assert!(first.id.starts_with("U_"));
        assert!(first.name.is_none());

        let second = service
            .register(Some("ada@example.com"), Some("Ada"))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_register_requires_email() {
        let service = service().await;
        let err = service.register(None, Some("Ada")).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err = service.register(Some("   "), None).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_ensure_for_identity_creates_then_reuses() {
        let service = service().await;
        let created = service
            .ensure_for_identity(&identity("ada@example.com", "g-1"))
            .await
            .unwrap();
        assert_eq!(created.google_id.as_deref(), Some("g-1"));

        let again = service
            .ensure_for_identity(&identity("ADA@example.com", "g-1"))
            .await
            .unwrap();
        assert_eq!(again, created);
    }

    #[tokio::test]
    async fn test_ensure_for_identity_links_existing_row() {
        let service = service().await;
        let registered = service.register(Some("ada@example.com"), None).await.unwrap();
        assert!(registered.google_id.is_none());

        let linked = service
            .ensure_for_identity(&identity("ada@example.com", "g-1"))
            .await
            .unwrap();
        assert_eq!(linked.id, registered.id);
        assert_eq!(linked.google_id.as_deref(), Some("g-1"));
        assert_eq!(linked.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_register_endpoint() {
        let app = test_app(FakeVerifier::default()).await;

        let (status, body) = app
            .post("/register-ctag", json!({ "email": "ada@example.com", "name": "Ada" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["email"], "ada@example.com");

        // No CTag is created by this endpoint
        let (_, check) = app.get("/api/ctags/check/ada@example.com").await;
        assert_eq!(check["registered"], false);

        let (status, _) = app.post("/register-ctag", json!({ "name": "Ada" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
