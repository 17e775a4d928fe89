// Core modules
mod types;

pub mod api;
pub mod auth;
pub mod db;

// Re-export key types and functions
pub use api::{create_router, AppState};
pub use auth::{issue_token, AuthConfig, AuthError, AuthExtractor, UserContext, UserStore};
pub use db::{create_connection, ensure_schema, ContactRecord, DatabaseConfig, QueryBuilder};
pub use types::{ContactId, ExternalUserId, IdentityProvider};

use anyhow::Result;
use axum::Router;
use std::sync::Arc;

/// Convenience function to create a fully configured application.
///
/// This opens the database connection, applies the schema, and wires the
/// identity resolver into a serving router.
pub async fn create_app(db_config: DatabaseConfig, auth_config: AuthConfig) -> Result<Router> {
    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;

    let state = AppState {
        db: db.clone(),
        auth: Arc::new(AuthExtractor::new(auth_config, db)),
    };

    Ok(create_router(state))
}
