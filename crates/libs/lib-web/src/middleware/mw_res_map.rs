//! # Response Mapping Middleware
//!
//! Keeps the error body uniform. Responses produced by [`AppError`] already
//! carry `{error, field, tag, code}`; anything else that fails (a 405 from the
//! router, a plain-text extractor rejection) is rewritten into the same shape.
//!
//! [`AppError`]: lib_core::AppError

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lib_core::dto::auth::ErrorResponse;
use tracing::{error, warn};

use super::mw_req_stamp::RequestStamp;

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Standard error body for a bare status.
pub fn error_body(status: StatusCode) -> ErrorResponse {
    let tag = match status {
        StatusCode::NOT_FOUND => "not-found",
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "auth",
        s if s.is_server_error() => "dependency-failure",
        _ => "validation",
    };

    ErrorResponse {
        error: status.canonical_reason().unwrap_or("Request failed").to_string(),
        field: "request".to_string(),
        tag: tag.to_string(),
        code: status.as_u16().to_string(),
    }
}

pub async fn map_res(req: Request, next: Next) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_default();

    let res = next.run(req).await;
    let status = res.status();

    if status.is_server_error() {
        error!(request_id = %request_id, "[RESPONSE] Server error: {}", status);
    }

    if (status.is_client_error() || status.is_server_error()) && !is_json(&res) {
        warn!(request_id = %request_id, "[RESPONSE] Rewriting bare {} into error body", status);
        let (mut parts, _) = res.into_parts();
        parts.headers.remove(CONTENT_TYPE);
        parts.headers.remove("content-length");
        return (parts, Json(error_body(status))).into_response();
    }

    res
}
