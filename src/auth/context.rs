//! User context for request-scoped identity.

use crate::types::{ExternalUserId, IdentityProvider};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// User context extracted from the HTTP request.
///
/// This struct is passed through the request handling chain to provide
/// user identity for all operations. It is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// Database record ID for this user
    user_id: RecordId,
    /// External identity (JWT sub claim)
    external_id: ExternalUserId,
    /// Identity provider that authenticated this user
    provider: IdentityProvider,
    /// Optional email for display
    email: Option<String>,
    /// Optional display name
    display_name: Option<String>,
    /// Whether this is an anonymous/local user
    is_anonymous: bool,
}

impl UserContext {
    /// Create a new user context.
    pub fn new(
        user_id: RecordId,
        external_id: ExternalUserId,
        provider: IdentityProvider,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        let is_anonymous = provider.as_str() == "anonymous";
        Self {
            user_id,
            external_id,
            provider,
            email,
            display_name,
            is_anonymous,
        }
    }

    /// Create an anonymous user context for local/single-user mode.
    pub fn anonymous(user_id: RecordId) -> Self {
        Self {
            user_id,
            external_id: ExternalUserId::new("anonymous"),
            provider: IdentityProvider::new("anonymous"),
            email: None,
            display_name: Some("Local User".to_string()),
            is_anonymous: true,
        }
    }

    /// Get the database user ID.
    pub fn user_id(&self) -> &RecordId {
        &self.user_id
    }

    /// Get the user ID as a string for use in queries.
    pub fn user_id_string(&self) -> String {
        self.user_id.to_string()
    }

    /// Get the external identity.
    pub fn external_id(&self) -> &ExternalUserId {
        &self.external_id
    }

    /// Get the identity provider.
    pub fn provider(&self) -> &IdentityProvider {
        &self.provider
    }

    /// Get the email if available.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Get the display name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Check if this is an anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    /// Get a display-friendly name for this user.
    pub fn display(&self) -> String {
        if let Some(name) = &self.display_name {
            name.clone()
        } else if let Some(email) = &self.email {
            email.clone()
        } else if self.is_anonymous {
            "Anonymous".to_string()
        } else {
            self.external_id.to_string()
        }
    }
}
