//! User storage and management.

use anyhow::Result;
use surrealdb::RecordId;

use crate::db::schema::{UserCreate, UserRecord};
use crate::db::Db;

/// User store for database operations.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get or create a user by external identity.
    ///
    /// This is the main entry point for authentication - it either finds an
    /// existing user or creates a new one.
    pub async fn get_or_create_user(
        &self,
        external_id: &str,
        provider: &str,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<UserRecord> {
        // Try to find existing user
        if let Some(user) = self.get_user_by_external_id(external_id, provider).await? {
            // Update last_seen_at
            self.update_last_seen(&user.id).await?;
            return Ok(user);
        }

        // Create new user
        let create = UserCreate {
            external_id: external_id.to_string(),
            provider: provider.to_string(),
            email: email.map(|s| s.to_string()),
            display_name: display_name.map(|s| s.to_string()),
        };

        self.create_user(&create).await
    }

    /// Get a user by external ID and provider.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<UserRecord>> {
        let external_id = external_id.to_string();
        let provider = provider.to_string();

        let query = r#"
            SELECT * FROM user
            WHERE external_id = $external_id
              AND provider = $provider
            LIMIT 1
        "#;

        let mut res = self.db
            .query(query)
            .bind(("external_id", external_id))
            .bind(("provider", provider))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Get a user by database ID.
    pub async fn get_user_by_id(&self, user_id: &RecordId) -> Result<Option<UserRecord>> {
        let query = "SELECT * FROM user WHERE id = $id LIMIT 1";

        let mut res = self.db
            .query(query)
            .bind(("id", user_id.clone()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user.
    async fn create_user(&self, create: &UserCreate) -> Result<UserRecord> {
        let external_id = create.external_id.clone();
        let provider = create.provider.clone();
        let email = create.email.clone();
        let display_name = create.display_name.clone();

        let query = r#"
            CREATE user CONTENT {
                external_id: $external_id,
                provider: $provider,
                email: $email,
                display_name: $display_name,
                is_active: true,
                last_seen_at: time::now()
            }
        "#;

        let mut res = self.db
            .query(query)
            .bind(("external_id", external_id))
            .bind(("provider", provider))
            .bind(("email", email))
            .bind(("display_name", display_name))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        users.into_iter().next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }

    /// Update user's last_seen_at timestamp.
    async fn update_last_seen(&self, user_id: &RecordId) -> Result<()> {
        let query = r#"
            UPDATE user SET
                last_seen_at = time::now(),
                updated_at = time::now()
            WHERE id = $id
        "#;

        self.db
            .query(query)
            .bind(("id", user_id.clone()))
            .await?;

        Ok(())
    }

    /// Deactivate a user account.
    pub async fn deactivate_user(&self, user_id: &RecordId) -> Result<()> {
        let query = r#"
            UPDATE user SET
                is_active = false,
                updated_at = time::now()
            WHERE id = $id
        "#;

        self.db
            .query(query)
            .bind(("id", user_id.clone()))
            .await?;

        Ok(())
    }

    /// Reactivate a user account.
    pub async fn reactivate_user(&self, user_id: &RecordId) -> Result<()> {
        let query = r#"
            UPDATE user SET
                is_active = true,
                updated_at = time::now()
            WHERE id = $id
        "#;

        self.db
            .query(query)
            .bind(("id", user_id.clone()))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection, ensure_schema, DatabaseConfig};

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_or_create_user_creates_new() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        let user = store.get_or_create_user(
            "sub123",
            "jwt",
            Some("test@example.com"),
            Some("Test User"),
        ).await.unwrap();

        assert_eq!(user.external_id, "sub123");
        assert_eq!(user.provider, "jwt");
        assert_eq!(user.email, Some("test@example.com".to_string()));
        assert_eq!(user.display_name, Some("Test User".to_string()));
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_get_or_create_user_returns_existing() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        // Create user
        let user1 = store.get_or_create_user(
            "sub123",
            "jwt",
            Some("test@example.com"),
            Some("Test User"),
        ).await.unwrap();

        // Get same user again
        let user2 = store.get_or_create_user(
            "sub123",
            "jwt",
            Some("test@example.com"),
            Some("Test User"),
        ).await.unwrap();

        assert_eq!(user1.id, user2.id);
    }

    #[tokio::test]
    async fn test_user_deactivation() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        let user = store.get_or_create_user(
            "sub123",
            "jwt",
            None,
            None,
        ).await.unwrap();

        assert!(user.is_active);

        // Deactivate
        store.deactivate_user(&user.id).await.unwrap();

        let updated = store.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(!updated.is_active);

        // Reactivate
        store.reactivate_user(&user.id).await.unwrap();

        let reactivated = store.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(reactivated.is_active);
    }

    #[tokio::test]
    async fn test_different_providers_different_users() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        // Same external_id but different providers = different users
        let user1 = store.get_or_create_user(
            "user123",
            "jwt",
            None,
            None,
        ).await.unwrap();

        let user2 = store.get_or_create_user(
            "user123",
            "anonymous",
            None,
            None,
        ).await.unwrap();

        assert_ne!(user1.id, user2.id);
    }
}
