//! Mandatory-header admission filter.
//!
//! Applied as a router-wide layer so it runs before routing for every
//! endpoint, present and future, with no per-route opt-out.

use crate::api::error::ApiError;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Header every request must carry to be admitted.
pub const CUSTOM_HEADER: &str = "X-Custom-Header";

/// Reject requests that do not present a non-empty `X-Custom-Header`.
///
/// The value itself is not validated. Admitted requests pass through
/// unchanged and the inner response is forwarded unmodified.
pub async fn require_custom_header(request: Request, next: Next) -> Response {
    let admitted = request
        .headers()
        .get(CUSTOM_HEADER)
        .is_some_and(|value| !value.as_bytes().is_empty());

    if !admitted {
        return ApiError::MissingHeader.into_response();
    }

    next.run(request).await
}
