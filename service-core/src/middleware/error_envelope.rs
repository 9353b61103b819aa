use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorEnvelope;

/// Rewrites error responses the framework produces on its own (unknown
/// method, extractor rejections, body limits) into the JSON error envelope.
/// Responses that are already JSON pass through untouched.
pub async fn error_envelope_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if is_json {
        return response;
    }

    tracing::debug!(status = status.as_u16(), "Wrapping bare error response");

    let (parts, _) = response.into_parts();
    let mut wrapped = ErrorEnvelope::for_status(status).into_response();
    for name in [header::ALLOW, header::RETRY_AFTER] {
        if let Some(value) = parts.headers.get(&name) {
            wrapped.headers_mut().insert(name, value.clone());
        }
    }
    wrapped
}
