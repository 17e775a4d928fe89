//! Authentication extractor for HTTP requests.

use std::fmt;
use std::sync::Arc;

use crate::auth::context::UserContext;
use crate::auth::user_store::UserStore;
use crate::db::Db;
use crate::types::{ExternalUserId, IdentityProvider};
use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether to allow anonymous access (single-user local mode)
    pub allow_anonymous: bool,
    /// Shared secret for bearer-token signature verification (HS256)
    pub secret: Option<String>,
    /// Expected token issuer, validated when set
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // Default to anonymous for local development
            allow_anonymous: true,
            secret: None,
            issuer: None,
        }
    }
}

impl AuthConfig {
    /// Create a config for local single-user mode.
    pub fn local() -> Self {
        Self {
            allow_anonymous: true,
            ..Default::default()
        }
    }

    /// Create a config for bearer-token authentication.
    pub fn with_secret(secret: String) -> Self {
        Self {
            allow_anonymous: false,
            secret: Some(secret),
            ..Default::default()
        }
    }

    /// Require tokens to carry the given issuer.
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = Some(issuer);
        self
    }
}

/// Authentication errors.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No credential provided and anonymous not allowed
    Unauthenticated,
    /// Invalid or expired bearer token
    InvalidToken(String),
    /// User is deactivated
    UserDeactivated,
    /// Database error
    DatabaseError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Authentication required"),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::UserDeactivated => write!(f, "User account is deactivated"),
            Self::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Authentication extractor for HTTP requests.
///
/// Resolves the `Authorization` header to an authenticated [`UserContext`],
/// or fails without touching anything else in the request.
pub struct AuthExtractor {
    config: AuthConfig,
    user_store: Arc<UserStore>,
}

impl AuthExtractor {
    /// Create a new auth extractor.
    pub fn new(config: AuthConfig, db: Db) -> Self {
        Self {
            config,
            user_store: Arc::new(UserStore::new(db)),
        }
    }

    /// Get reference to the user store.
    pub fn user_store(&self) -> &Arc<UserStore> {
        &self.user_store
    }

    /// Extract user context from the Authorization header.
    ///
    /// This checks authentication in order:
    /// 1. Bearer token if present
    /// 2. Anonymous if allowed
    pub async fn extract_user(
        &self,
        authorization: Option<&str>,
    ) -> Result<UserContext, AuthError> {
        // Try Bearer token first
        if let Some(auth_header) = authorization
            && let Some(token) = auth_header.strip_prefix("Bearer ")
        {
            return self.extract_from_token(token).await;
        }

        // Fall back to anonymous if allowed
        if self.config.allow_anonymous {
            return self.extract_anonymous().await;
        }

        Err(AuthError::Unauthenticated)
    }

    /// Extract user from a bearer token with HS256 signature verification.
    async fn extract_from_token(&self, token: &str) -> Result<UserContext, AuthError> {
        let secret = self.config.secret.as_ref().ok_or_else(|| {
            AuthError::InvalidToken("Bearer authentication not configured".to_string())
        })?;

        // Set up validation
        let mut validation = Validation::new(Algorithm::HS256);

        // Configure issuer validation
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }

        // Decode and validate the token
        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(format!("Signature verification failed: {}", e)))?;

        let claims = token_data.claims;

        // Additional expiration check (jsonwebtoken does this, but be explicit)
        if let Some(exp) = claims.exp {
            let now = chrono::Utc::now().timestamp();
            if (exp as i64) < now {
                return Err(AuthError::InvalidToken("Token expired".to_string()));
            }
        }

        debug!("Bearer token verified successfully for subject: {}", claims.sub);

        // Get or create user
        let user = self
            .user_store
            .get_or_create_user(
                &claims.sub,
                "jwt",
                claims.email.as_deref(),
                claims.name.as_deref(),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if !user.is_active {
            return Err(AuthError::UserDeactivated);
        }

        let ctx = UserContext::new(
            user.id,
            ExternalUserId::new(claims.sub),
            IdentityProvider::new("jwt"),
            claims.email,
            claims.name,
        );

        Ok(ctx)
    }

    /// Extract anonymous user for local mode.
    async fn extract_anonymous(&self) -> Result<UserContext, AuthError> {
        // Get or create the anonymous user
        let user = self
            .user_store
            .get_or_create_user("anonymous", "anonymous", None, Some("Local User"))
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if !user.is_active {
            return Err(AuthError::UserDeactivated);
        }

        Ok(UserContext::anonymous(user.id))
    }
}

/// Bearer token claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: Option<u64>,
}

/// Issue a signed bearer token for the given subject.
///
/// This is the user subsystem's token-issuance operation, consumed by the
/// `create-token` CLI command and by tests.
pub fn issue_token(
    secret: &str,
    subject: &str,
    email: Option<&str>,
    name: Option<&str>,
    issuer: Option<&str>,
    ttl: chrono::Duration,
) -> Result<String> {
    let exp = chrono::Utc::now() + ttl;
    let claims = TokenClaims {
        sub: subject.to_string(),
        email: email.map(|s| s.to_string()),
        name: name.map(|s| s.to_string()),
        iss: issuer.map(|s| s.to_string()),
        exp: Some(exp.timestamp() as u64),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection, ensure_schema, DatabaseConfig};

    async fn setup_test_db() -> crate::db::Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.allow_anonymous);
        assert!(config.secret.is_none());
        assert!(config.issuer.is_none());
    }

    #[test]
    fn test_auth_config_local() {
        let config = AuthConfig::local();
        assert!(config.allow_anonymous);
    }

    #[test]
    fn test_auth_config_with_secret() {
        let config = AuthConfig::with_secret("secret123".to_string());
        assert!(!config.allow_anonymous);
        assert_eq!(config.secret, Some("secret123".to_string()));
    }

    #[test]
    fn test_auth_config_with_issuer() {
        let config = AuthConfig::with_secret("secret123".to_string())
            .with_issuer("contact-service".to_string());
        assert_eq!(config.issuer, Some("contact-service".to_string()));
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::Unauthenticated.to_string(),
            "Authentication required"
        );
        assert_eq!(
            AuthError::UserDeactivated.to_string(),
            "User account is deactivated"
        );
        assert_eq!(
            AuthError::InvalidToken("bad".to_string()).to_string(),
            "Invalid token: bad"
        );
    }

    #[tokio::test]
    async fn test_auth_extractor_anonymous_mode() {
        let db = setup_test_db().await;
        let extractor = AuthExtractor::new(AuthConfig::local(), db);

        let result = extractor.extract_user(None).await;

        assert!(result.is_ok());
        let ctx = result.unwrap();
        assert!(ctx.is_anonymous());
    }

    #[tokio::test]
    async fn test_auth_extractor_valid_token() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        let token = issue_token(
            "secret123",
            "sub123",
            Some("user@example.com"),
            Some("Test User"),
            None,
            chrono::Duration::hours(1),
        )
        .unwrap();

        let ctx = extractor
            .extract_user(Some(&format!("Bearer {}", token)))
            .await
            .unwrap();

        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.external_id().as_str(), "sub123");
        assert_eq!(ctx.provider().as_str(), "jwt");
        assert_eq!(ctx.email(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn test_auth_extractor_garbage_token() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        let result = extractor.extract_user(Some("Bearer not-a-token")).await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_auth_extractor_wrong_secret() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        let token = issue_token(
            "other-secret",
            "sub123",
            None,
            None,
            None,
            chrono::Duration::hours(1),
        )
        .unwrap();

        let result = extractor
            .extract_user(Some(&format!("Bearer {}", token)))
            .await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_auth_extractor_expired_token() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        // Past the default validation leeway
        let token = issue_token(
            "secret123",
            "sub123",
            None,
            None,
            None,
            chrono::Duration::minutes(-5),
        )
        .unwrap();

        let result = extractor
            .extract_user(Some(&format!("Bearer {}", token)))
            .await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_auth_extractor_issuer_mismatch() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string())
            .with_issuer("contact-service".to_string());
        let extractor = AuthExtractor::new(config, db);

        let token = issue_token(
            "secret123",
            "sub123",
            None,
            None,
            Some("someone-else"),
            chrono::Duration::hours(1),
        )
        .unwrap();

        let result = extractor
            .extract_user(Some(&format!("Bearer {}", token)))
            .await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_auth_extractor_no_credential_rejected() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        let result = extractor.extract_user(None).await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_user_deactivation_blocks_access() {
        let db = setup_test_db().await;
        let config = AuthConfig::with_secret("secret123".to_string());
        let extractor = AuthExtractor::new(config, db);

        let token = issue_token(
            "secret123",
            "sub123",
            None,
            None,
            None,
            chrono::Duration::hours(1),
        )
        .unwrap();
        let auth_header = format!("Bearer {}", token);

        let ctx = extractor.extract_user(Some(&auth_header)).await.unwrap();

        extractor
            .user_store()
            .deactivate_user(ctx.user_id())
            .await
            .unwrap();

        let result = extractor.extract_user(Some(&auth_header)).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::UserDeactivated));
    }

    #[test]
    fn test_token_claims_deserialization() {
        let json = r#"{
            "sub": "user123",
            "email": "user@example.com",
            "name": "Test User",
            "exp": 1735689600
        }"#;

        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email, Some("user@example.com".to_string()));
        assert_eq!(claims.name, Some("Test User".to_string()));
        assert_eq!(claims.exp, Some(1735689600));
    }
}
