use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};
use trai_domain::constants::tables;

/// Account summary shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct AccountRow {
    pub key: String,
    pub nickname: String,
    pub email: String,
    pub role: String,
    pub profile_completed: bool,
    pub created_at: String,
}

#[derive(Debug, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
struct CountRow {
    count: i64,
}

/// Listing filter; `search` must already be lowercase.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub search: Option<String>,
    pub role: Option<String>,
}

impl AccountFilter {
    fn where_clause(&self) -> String {
        let mut conditions = Vec::new();
        if self.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(email), $search) \
                 OR string::contains(string::lowercase(nickname), $search))",
            );
        }
        if self.role.is_some() {
            conditions.push("role = $role");
        }
        if conditions.is_empty() { String::new() } else { format!("WHERE {}", conditions.join(" AND ")) }
    }
}

const ACCOUNT_FIELDS: &str = "key, nickname, email, role, profile_completed, created_at";

/// Tables whose rows belong to a user through `user_id`.
const OWNED_TABLES: &[&str] = &[
    tables::REFRESH_TOKEN,
    tables::WORKOUT,
    tables::WORKOUT_TEST,
    tables::PROGRESS,
    tables::MEAL,
    tables::AI_RECOMMENDATION,
    tables::ATTACHMENT,
];

/// One page plus the total match count, newest accounts first.
pub(crate) async fn list_accounts(
    db: &Database,
    filter: &AccountFilter,
    start: i64,
    limit: i64,
) -> Result<(Vec<AccountRow>, i64), DatabaseError> {
    let where_clause = filter.where_clause();
    let sql = format!(
        "SELECT {ACCOUNT_FIELDS} FROM user {where_clause} ORDER BY created_at DESC LIMIT $limit START $start;
         SELECT count() FROM user {where_clause} GROUP ALL;"
    );

    let mut response = db
        .query(sql)
        .bind(("search", filter.search.clone()))
        .bind(("role", filter.role.clone()))
        .bind(("limit", limit))
        .bind(("start", start))
        .await
        .context("Listing accounts")?;

    let items: Vec<AccountRow> = response.take(0).context("Decoding accounts")?;
    let counts: Vec<CountRow> = response.take(1).context("Counting accounts")?;
    Ok((items, counts.first().map_or(0, |row| row.count)))
}

pub(crate) async fn find_account(db: &Database, key: &str) -> Result<Option<AccountRow>, DatabaseError> {
    let mut rows: Vec<AccountRow> = db
        .query(format!("SELECT {ACCOUNT_FIELDS} FROM user WHERE key = $key LIMIT 1"))
        .bind(("key", key.to_owned()))
        .await
        .context("Loading account")?
        .take(0)
        .context("Decoding account")?;
    Ok(rows.pop())
}

/// Deletes the account and every row it owns in one transaction.
///
/// Returns the object-store keys of the removed attachments.
pub(crate) async fn delete_account(db: &Database, key: &str) -> Result<Vec<String>, DatabaseError> {
    let object_keys: Vec<String> = db
        .query("SELECT VALUE object_key FROM attachment WHERE user_id = $user")
        .bind(("user", key.to_owned()))
        .await
        .context("Collecting attachment keys")?
        .take(0)
        .context("Decoding attachment keys")?;

    let deletes = OWNED_TABLES
        .iter()
        .map(|table| format!("DELETE {table} WHERE user_id = $user;"))
        .collect::<Vec<_>>()
        .join("\n");
    let sql = format!(
        "BEGIN TRANSACTION;
         {deletes}
         DELETE user WHERE key = $user;
         COMMIT TRANSACTION;"
    );

    db.query(sql)
        .bind(("user", key.to_owned()))
        .await
        .context("Deleting account")?
        .check()
        .context("Deleting account")?;

    Ok(object_keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_only_mentions_active_filters() {
        assert_eq!(AccountFilter::default().where_clause(), "");

        let role_only = AccountFilter { role: Some("pro".into()), ..AccountFilter::default() };
        assert_eq!(role_only.where_clause(), "WHERE role = $role");

        let both = AccountFilter { search: Some("ann".into()), role: Some("pro".into()) };
        let clause = both.where_clause();
        assert!(clause.contains("$search"));
        assert!(clause.ends_with("AND role = $role"));
    }
}
