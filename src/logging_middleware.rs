// src/logging_middleware.rs
//! Request id stamping and debug-level body logging

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request bodies larger than this are rejected with 413
const MAX_REQUEST_BODY: usize = 64 * 1024;

/// Reuse the caller's request id or mint a new one
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn render_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    // Credentials never reach the logs
    if body_str.contains("\"credential\"") || body_str.contains("\"token\"") {
        return Some("<redacted>".to_string());
    }
    Some(
        serde_json::from_str::<serde_json::Value>(body_str)
            .ok()
            .and_then(|json| serde_json::to_string(&json).ok())
            .unwrap_or_else(|| body_str.to_string()),
    )
}

/// Tags every request with an `x-request-id` and logs JSON bodies at debug level
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let id = request_id(&request);
    let span = tracing::info_span!("request", request_id = %id);

    async move {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_REQUEST_BODY)
            .await
            .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

        if let Some(rendered) = render_body(&bytes) {
            debug!(method = %parts.method, uri = %parts.uri, request_body = %rendered, "📥 Request");
        }

        let request = Request::from_parts(parts, Body::from(bytes));
        let response = next.run(request).await;

        let (mut parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(rendered) = render_body(&bytes) {
            debug!(status = %parts.status, response_body = %rendered, "📤 Response");
        }

        if let Ok(value) = HeaderValue::from_str(&id) {
            parts.headers.insert(REQUEST_ID_HEADER, value);
        }

        Ok(Response::from_parts(parts, Body::from(bytes)))
    }
    .instrument(span)
    .await
}
