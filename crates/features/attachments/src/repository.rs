use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};

/// One row of the `attachment` table.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct AttachmentRecord {
    pub key: String,
    pub user_id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub filename: String,
    pub object_key: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: String,
}

impl AttachmentRecord {
    /// Owners and administrators may read or remove the object.
    #[must_use]
    pub fn visible_to(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttachmentStore;

impl AttachmentStore {
    /// # Errors
    /// Storage failures.
    pub async fn create(db: &Database, record: AttachmentRecord) -> Result<(), DatabaseError> {
        db.query("CREATE attachment CONTENT $record RETURN NONE")
            .bind(("record", record))
            .await
            .context("Creating attachment")?
            .check()
            .context("Creating attachment")?;
        Ok(())
    }

    /// # Errors
    /// Storage failures.
    pub async fn find(db: &Database, key: &str) -> Result<Option<AttachmentRecord>, DatabaseError> {
        let mut rows: Vec<AttachmentRecord> = db
            .query("SELECT * OMIT id FROM attachment WHERE key = $key LIMIT 1")
            .bind(("key", key.to_owned()))
            .await
            .context("Loading attachment")?
            .take(0)
            .context("Decoding attachment")?;
        Ok(rows.pop())
    }

    /// Attachments of one entity, oldest first. `owner` narrows the list to one user.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn for_entity(
        db: &Database,
        entity_type: &str,
        entity_id: &str,
        owner: Option<&str>,
    ) -> Result<Vec<AttachmentRecord>, DatabaseError> {
        let sql = if owner.is_some() {
            "SELECT * OMIT id FROM attachment \
             WHERE entity_type = $type AND entity_id = $entity AND user_id = $owner \
             ORDER BY created_at ASC"
        } else {
            "SELECT * OMIT id FROM attachment \
             WHERE entity_type = $type AND entity_id = $entity \
             ORDER BY created_at ASC"
        };
        let rows: Vec<AttachmentRecord> = db
            .query(sql)
            .bind(("type", entity_type.to_owned()))
            .bind(("entity", entity_id.to_owned()))
            .bind(("owner", owner.map(str::to_owned)))
            .await
            .context("Listing attachments")?
            .take(0)
            .context("Decoding attachments")?;
        Ok(rows)
    }

    /// # Errors
    /// Storage failures.
    pub async fn delete(db: &Database, key: &str) -> Result<(), DatabaseError> {
        db.query("DELETE attachment WHERE key = $key")
            .bind(("key", key.to_owned()))
            .await
            .context("Deleting attachment")?
            .check()
            .context("Deleting attachment")?;
        Ok(())
    }
}
