use serde::{Deserialize, Serialize};
use surrealdb::{sql::Datetime, RecordId};

/// Persisted representation of a contact in SurrealDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Stable database identifier for this contact (table: `contact`).
    ///
    /// The record key is the generated contact token, so this id is unique
    /// and immutable for the lifetime of the record.
    pub id: RecordId,
    /// Contact display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// The authenticated user this contact was created by.
    pub owner_id: RecordId,
    /// When this record was committed.
    pub created_at: Option<Datetime>,
}

/// Payload used when inserting a new contact into the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCreate {
    /// Contact display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Owning user for this contact.
    pub owner_id: RecordId,
}

/// Persisted representation of an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable database identifier for this user (table: `user`).
    pub id: RecordId,
    /// External identity from the authentication provider (JWT `sub` claim).
    pub external_id: String,
    /// Identity provider that authenticated this user.
    pub provider: String,
    /// Optional email for display.
    pub email: Option<String>,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Whether this account may authenticate.
    pub is_active: bool,
    /// When this user last authenticated.
    pub last_seen_at: Option<Datetime>,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
    /// When this record was last updated.
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new user into the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    /// External identity from the authentication provider.
    pub external_id: String,
    /// Identity provider that authenticated this user.
    pub provider: String,
    /// Optional email for display.
    pub email: Option<String>,
    /// Optional display name.
    pub display_name: Option<String>,
}
