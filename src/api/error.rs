//! HTTP error taxonomy and its JSON envelope.
//!
//! Every failure a request can produce is mapped here to a status code and a
//! `{"detail": ...}` body. Internal causes are logged and replaced with an
//! opaque message before serialisation.

use crate::auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use tracing::error;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending payload field.
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Terminal request failures.
#[derive(Debug)]
pub enum ApiError {
    /// The mandatory custom header was absent or empty
    MissingHeader,
    /// Payload failed structural validation
    Validation(Vec<FieldError>),
    /// Credential missing or invalid
    Unauthorized(String),
    /// Credential valid but the account may not act
    Forbidden(String),
    /// Persistence or other server-side failure
    Internal(anyhow::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "{}", MISSING_HEADER_DETAIL),
            Self::Validation(errors) => write!(f, "{} validation error(s)", errors.len()),
            Self::Unauthorized(msg) => write!(f, "{}", msg),
            Self::Forbidden(msg) => write!(f, "{}", msg),
            Self::Internal(err) => write!(f, "{}", err),
        }
    }
}

/// Detail message returned when the admission filter rejects a request.
pub const MISSING_HEADER_DETAIL: &str = "'X-Custom-Header' header is required";

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHeader => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Self::MissingHeader => json!(MISSING_HEADER_DETAIL),
            Self::Validation(errors) => json!(errors),
            Self::Unauthorized(msg) | Self::Forbidden(msg) => json!(msg),
            Self::Internal(err) => {
                error!("request failed: {:#}", err);
                json!("Internal server error")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::UserDeactivated => Self::Forbidden(err.to_string()),
            AuthError::DatabaseError(msg) => Self::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MissingHeader.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Unauthorized("no".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::Unauthenticated),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidToken("bad".into())),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserDeactivated),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::DatabaseError("down".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_field_error_serialization() {
        let err = FieldError::new("phone", "Field required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "phone");
        assert_eq!(json["message"], "Field required");
    }
}
