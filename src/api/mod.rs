// HTTP surface of the contact service: router assembly, admission filter,
// contact creation, and diagnostic endpoints.

pub mod admission;
pub mod contacts;
pub mod error;

use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthExtractor;
use crate::db::Db;

/// Request-scoped capabilities shared through axum's `State`.
///
/// The db handle is a cheap clone of one connection; each request runs its
/// own unit of work against it.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub auth: Arc<AuthExtractor>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/message/", get(test_message))
        .route("/health", get(health_check))
        .route("/contacts/", post(contacts::create_contact))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(admission::require_custom_header)),
        )
        .with_state(state)
}

/// Fixed acknowledgment used to verify the service and the header gate are
/// reachable. No business logic.
async fn test_message() -> Json<Value> {
    Json(serde_json::json!({ "msg": "Service is reachable" }))
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
