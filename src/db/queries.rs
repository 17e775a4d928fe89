// Database query helpers for SurrealDB.
//
// These perform real SurrealDB queries but keep the logic simple so they can
// evolve alongside the schema. All contact writes go through `create_contact`,
// which is the persistence gateway's add-and-commit operation.

use crate::db::schema::*;
use crate::types::ContactId;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use surrealdb::{engine::any::Any, RecordId, Surreal};

pub struct QueryBuilder;

impl QueryBuilder {
    /// Insert a new contact as a single unit of work.
    ///
    /// The generated contact token doubles as the record key, so the engine
    /// rejects a second insert under the same id. The insert runs inside an
    /// explicit transaction: either the committed row comes back, or nothing
    /// was written.
    pub async fn create_contact(
        db: &Surreal<Any>,
        id: &ContactId,
        data: &ContactCreate,
    ) -> Result<ContactRecord> {
        let mut res = db
            .query(
                r#"
                BEGIN TRANSACTION;
                CREATE type::thing('contact', $id) SET
                    name = $name,
                    email = $email,
                    phone = $phone,
                    owner_id = $owner_id,
                    created_at = time::now();
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("id", id.clone()))
            .bind(("name", data.name.clone()))
            .bind(("email", data.email.clone()))
            .bind(("phone", data.phone.clone()))
            .bind(("owner_id", data.owner_id.clone()))
            .await?;

        let created: Option<ContactRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create contact record"))
    }

    pub async fn find_contact_by_id(
        db: &Surreal<Any>,
        contact_id: RecordId,
    ) -> Result<Option<ContactRecord>> {
        let mut res = db
            .query(
                r#"
                SELECT * FROM contact
                WHERE id = $id
                LIMIT 1
                "#,
            )
            .bind(("id", contact_id))
            .await?;

        let contact: Option<ContactRecord> = res.take(0)?;
        Ok(contact)
    }

    /// List all contacts created by the given user, newest first.
    pub async fn list_contacts_for_user(
        db: &Surreal<Any>,
        owner_id: RecordId,
    ) -> Result<Vec<ContactRecord>> {
        let mut res = db
            .query(
                r#"
                SELECT * FROM contact
                WHERE owner_id = $owner_id
                ORDER BY created_at DESC
                "#,
            )
            .bind(("owner_id", owner_id))
            .await?;

        let contacts: Vec<ContactRecord> = res.take(0)?;
        Ok(contacts)
    }

    /// Total number of contact rows in the store.
    pub async fn count_contacts(db: &Surreal<Any>) -> Result<u64> {
        #[derive(Deserialize)]
        struct CountRow {
            count: u64,
        }

        let mut res = db
            .query("SELECT count() FROM contact GROUP ALL")
            .await?;

        let row: Option<CountRow> = res.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }
}
