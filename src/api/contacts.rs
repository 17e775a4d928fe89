//! Contact creation endpoint.
//!
//! The handler body only runs once the request has been admitted, the
//! payload structurally validated, and the acting user resolved. Identity
//! resolution strictly precedes persistence: nothing is written for an
//! unauthenticated caller.

use crate::api::error::{ApiError, FieldError};
use crate::api::AppState;
use crate::auth::UserContext;
use crate::db::{ContactCreate, QueryBuilder};
use crate::types::ContactId;
use axum::extract::{FromRequest, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Caller-supplied contact fields. All of them are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Response shape for a created contact: the submitted fields plus the
/// generated identifier, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Fields a contact payload must carry.
const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "phone"];

/// Structurally validate a contact payload.
///
/// Reports every failing field at once rather than stopping at the first.
pub fn validate_payload(value: &Value) -> Result<ContactPayload, Vec<FieldError>> {
    let Some(object) = value.as_object() else {
        return Err(vec![FieldError::new("body", "Payload must be a JSON object")]);
    };

    let mut errors = Vec::new();
    for field in REQUIRED_FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => errors.push(FieldError::new(field, "Field required")),
            Some(Value::String(s)) if s.is_empty() => {
                errors.push(FieldError::new(field, "Field must not be empty"))
            }
            Some(Value::String(_)) => {}
            Some(_) => errors.push(FieldError::new(field, "Field must be a string")),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ContactPayload {
        name: object["name"].as_str().unwrap_or_default().to_string(),
        email: object["email"].as_str().unwrap_or_default().to_string(),
        phone: object["phone"].as_str().unwrap_or_default().to_string(),
    })
}

/// Payload extractor that fails with a field-level 422 before the handler
/// body runs.
pub struct ValidatedJson(pub ContactPayload);

impl FromRequest<AppState> for ValidatedJson {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
            })?;

        let payload = validate_payload(&value).map_err(ApiError::Validation)?;
        Ok(Self(payload))
    }
}

/// Identity extractor that fails with 401/403 before the handler body runs.
pub struct BearerUser(pub UserContext);

impl FromRequestParts<AppState> for BearerUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let ctx = state.auth.extract_user(authorization).await?;
        Ok(Self(ctx))
    }
}

/// `POST /contacts/`: persist a new contact for the authenticated user.
pub async fn create_contact(
    State(state): State<AppState>,
    BearerUser(user): BearerUser,
    ValidatedJson(payload): ValidatedJson,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let id = ContactId::generate();

    let create = ContactCreate {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        owner_id: user.user_id().clone(),
    };

    let record = QueryBuilder::create_contact(&state.db, &id, &create).await?;

    debug!(contact_id = %id, user = %user.display(), "contact created");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            id,
            name: record.name,
            email: record.email,
            phone: record.phone,
        }),
    ))
}
