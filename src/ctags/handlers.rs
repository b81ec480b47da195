use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::models::{
    CTagCreatedResponse, LinkAccountRequest, LinkWalletRequest, RegisterCTagRequest,
};
use super::services::{CTagService, NS_TAG_ID};
use crate::auth::AuthedSession;
use crate::common::{ApiError, AppState, Validator};

/// Unwraps a JSON body, turning extractor rejections into 400s
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Owner id and email from a registration body, or a validation error
fn registration_fields(request: &RegisterCTagRequest) -> Result<(&str, &str), ApiError> {
    request.validate(request).into_result()?;
    Ok((
        request.google_id.as_deref().unwrap_or_default(),
        request.email.as_deref().unwrap_or_default(),
    ))
}

fn created(message: &str, c_tag: super::models::CTag) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(CTagCreatedResponse {
            message: message.to_string(),
            c_tag,
        }),
    )
}

// ============================================================================
// Registration Handlers
// ============================================================================

/// POST /api/ctags/register - Register a new CTag with a random id
pub async fn register_ctag(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterCTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let (google_id, email) = registration_fields(&request)?;

    let ctag = CTagService::new(state.store.clone())
        .register(google_id, email)
        .await?;

    Ok(created("C-Tag registered successfully", ctag))
}

/// POST /api/ctags/auto-register - Register a CTag on the client's behalf
pub async fn auto_register_ctag(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterCTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let (google_id, email) = registration_fields(&request)?;

    let ctag = CTagService::new(state.store.clone())
        .auto_register(google_id, email)
        .await?;

    Ok(created("CTag auto-registered successfully", ctag))
}

/// POST /api/ctags/auto-create-ns - Create the fixed `ns` CTag
pub async fn create_ns_ctag(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterCTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let (google_id, email) = registration_fields(&request)?;

    let ctag = CTagService::new(state.store.clone())
        .create_named(google_id, email, NS_TAG_ID)
        .await?;

    Ok(created("NS CTag created successfully", ctag))
}

// ============================================================================
// Lookup Handlers
// ============================================================================

/// GET /api/ctags/:tag_id - Get a CTag by id
pub async fn get_ctag(
    Extension(state): Extension<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctag = CTagService::new(state.store.clone())
        .get_by_id(&tag_id)
        .await?;
    Ok(Json(ctag))
}

/// GET /api/ctags/check/:google_id - Whether an owner has any CTags
pub async fn check_registration(
    Extension(state): Extension<Arc<AppState>>,
    Path(google_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = CTagService::new(state.store.clone())
        .check_registration(&google_id)
        .await?;
    Ok(Json(status))
}

/// GET /api/ctags/user-ctags/:user_id - Tag ids owned by a Google subject
pub async fn list_user_ctags(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = CTagService::new(state.store.clone())
        .list_for_owner(&user_id)
        .await?;
    Ok(Json(tags))
}

// ============================================================================
// Linked Account Handlers
// ============================================================================

/// Fails with 403 unless the session owns the tag
async fn ensure_owner(
    service: &CTagService,
    session: &AuthedSession,
    tag_id: &str,
) -> Result<(), ApiError> {
    let ctag = service.get_by_id(tag_id).await?;
    if session.google_id() != Some(ctag.google_id.as_str()) {
        warn!(
            tag_id = %tag_id,
            user_id = %session.user_id(),
            "Rejected change to a CTag owned by another identity"
        );
        return Err(ApiError::Forbidden(
            "CTag belongs to another account".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/ctags/:tag_id/wallets - Link a web3 wallet
pub async fn link_wallet(
    Extension(state): Extension<Arc<AppState>>,
    session: AuthedSession,
    Path(tag_id): Path<String>,
    payload: Result<Json<LinkWalletRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let service = CTagService::new(state.store.clone());
    ensure_owner(&service, &session, &tag_id).await?;

    let ctag = service
        .link_wallet(&tag_id, request.wallet.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(serde_json::json!({ "cTag": ctag })))
}

/// POST /api/ctags/:tag_id/accounts - Link a web2 account email
pub async fn link_account(
    Extension(state): Extension<Arc<AppState>>,
    session: AuthedSession,
    Path(tag_id): Path<String>,
    payload: Result<Json<LinkAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let service = CTagService::new(state.store.clone());
    ensure_owner(&service, &session, &tag_id).await?;

    let ctag = service
        .link_web2_account(&tag_id, request.email.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(serde_json::json!({ "cTag": ctag })))
}
