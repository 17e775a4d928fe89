use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("CONTACTS_DB_URL")
                .unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("CONTACTS_DB_NAMESPACE")
                .unwrap_or_else(|_| "contacts".to_string()),
            database: env::var("CONTACTS_DB_DATABASE")
                .unwrap_or_else(|_| "service".to_string()),
            username: env::var("CONTACTS_DB_USERNAME").ok(),
            password: env::var("CONTACTS_DB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    // Use the specified namespace and database
    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    // Define schema for each table
    let schema_queries = vec![
        // Authenticated principals
        "DEFINE TABLE user SCHEMAFULL;
         DEFINE FIELD external_id ON TABLE user TYPE string;
         DEFINE FIELD provider ON TABLE user TYPE string;
         DEFINE FIELD email ON TABLE user TYPE option<string>;
         DEFINE FIELD display_name ON TABLE user TYPE option<string>;
         DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
         DEFINE FIELD last_seen_at ON TABLE user TYPE option<datetime>;
         DEFINE FIELD created_at ON TABLE user VALUE time::now();
         DEFINE FIELD updated_at ON TABLE user VALUE time::now();",

        // Contact records
        "DEFINE TABLE contact SCHEMAFULL;
         DEFINE FIELD name ON TABLE contact TYPE string;
         DEFINE FIELD email ON TABLE contact TYPE string;
         DEFINE FIELD phone ON TABLE contact TYPE string;
         DEFINE FIELD owner_id ON TABLE contact TYPE record<user>;
         DEFINE FIELD created_at ON TABLE contact VALUE time::now();",

        // Indexes for lookup paths
        "DEFINE INDEX user_external_identity ON TABLE user COLUMNS external_id, provider UNIQUE;
         DEFINE INDEX contact_owner ON TABLE contact COLUMNS owner_id;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
