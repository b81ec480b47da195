use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use std::sync::Arc;

use super::models::RegisterUserRequest;
use super::services::UsersService;
use crate::common::{ApiError, AppState};

/// POST /register-ctag
/// Upserts a user by email; no CTag is created
///
/// # Request Body
/// ```json
/// { "email": "a@x.com", "name": "Ada" }
/// ```
pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let users_service = UsersService::new(state.store.clone());
    let user = users_service
        .register(request.email.as_deref(), request.name.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "message": "User registered successfully",
        "data": user,
    })))
}
