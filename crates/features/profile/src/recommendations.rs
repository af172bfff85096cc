use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};

/// Stored kind of a generated profile tip.
pub const TIP: &str = "tip";

/// One row of `ai_recommendation`.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct RecommendationRecord {
    pub key: String,
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Recommendations;

impl Recommendations {
    /// # Errors
    /// Storage failures.
    pub async fn store(db: &Database, records: Vec<RecommendationRecord>) -> Result<(), DatabaseError> {
        if records.is_empty() {
            return Ok(());
        }
        db.query("INSERT INTO ai_recommendation $records RETURN NONE")
            .bind(("records", records))
            .await
            .context("Storing recommendations")?
            .check()
            .context("Storing recommendations")?;
        Ok(())
    }

    /// Newest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn latest(
        db: &Database,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<RecommendationRecord>, DatabaseError> {
        let rows: Vec<RecommendationRecord> = db
            .query(
                "SELECT * OMIT id FROM ai_recommendation WHERE user_id = $user \
                 ORDER BY created_at DESC, key DESC LIMIT $limit",
            )
            .bind(("user", user_id.to_owned()))
            .bind(("limit", limit))
            .await
            .context("Loading recommendations")?
            .take(0)
            .context("Decoding recommendations")?;
        Ok(rows)
    }
}
