use crate::model::{PatchValue, UserPatch, UserRecord};
use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};
use trai_domain::enums::Role;

#[derive(Debug, Clone, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
struct StoredRefreshToken {
    token_hash: String,
    user_id: String,
    expires_at: String,
    created_at: String,
}

/// A refresh token row as looked up during rotation.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct RefreshTokenRecord {
    pub user_id: String,
    pub expires_at: String,
}

/// Queries over the `user` table, shared with every slice that reads accounts.
#[derive(Debug, Clone, Copy)]
pub struct Users;

impl Users {
    /// # Errors
    /// Storage failures, including a unique-index violation on `email`.
    pub async fn create(db: &Database, user: UserRecord) -> Result<(), DatabaseError> {
        db.query("CREATE user CONTENT $user RETURN NONE")
            .bind(("user", user))
            .await
            .context("Creating user")?
            .check()
            .context("Creating user")?;
        Ok(())
    }

    /// Creates the account unless its email is taken. `false` when another row
    /// already owns the email, including one inserted by a concurrent sign-up
    /// between any earlier lookup and this write.
    ///
    /// # Errors
    /// Storage failures other than the email collision.
    pub async fn create_unique(db: &Database, user: UserRecord) -> Result<bool, DatabaseError> {
        let email = user.email.clone();
        match Self::create(db, user).await {
            Ok(()) => Ok(true),
            Err(err) => match Self::find_by_email(db, &email).await? {
                Some(_) => Ok(false),
                None => Err(err),
            },
        }
    }

    /// # Errors
    /// Storage failures.
    pub async fn find(db: &Database, key: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let mut users: Vec<UserRecord> = db
            .query("SELECT * OMIT id FROM user WHERE key = $key LIMIT 1")
            .bind(("key", key.to_owned()))
            .await
            .context("Loading user")?
            .take(0)
            .context("Decoding user")?;
        Ok(users.pop())
    }

    /// Lookup by email, compared case-insensitively.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let mut users: Vec<UserRecord> = db
            .query("SELECT * OMIT id FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.trim().to_lowercase()))
            .await
            .context("Loading user by email")?
            .take(0)
            .context("Decoding user")?;
        Ok(users.pop())
    }

    /// Applies `patch` and returns the updated row, `None` if the user is gone.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn update(db: &Database, key: &str, patch: UserPatch) -> Result<Option<UserRecord>, DatabaseError> {
        if patch.is_empty() {
            return Self::find(db, key).await;
        }

        let assignments = patch
            .fields
            .iter()
            .map(|(field, value)| match value {
                PatchValue::Unset => format!("{field} = NONE"),
                _ => format!("{field} = ${field}"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE user SET {assignments} WHERE key = $key RETURN NONE");

        let mut query = db.query(sql).bind(("key", key.to_owned()));
        for (field, value) in patch.fields {
            query = match value {
                PatchValue::Text(v) => query.bind((field, v)),
                PatchValue::Int(v) => query.bind((field, v)),
                PatchValue::Float(v) => query.bind((field, v)),
                PatchValue::Bool(v) => query.bind((field, v)),
                PatchValue::Unset => query,
            };
        }
        query.await.context("Updating user")?.check().context("Updating user")?;

        Self::find(db, key).await
    }

    /// # Errors
    /// Storage failures.
    pub async fn set_role(db: &Database, key: &str, role: Role) -> Result<Option<UserRecord>, DatabaseError> {
        Self::update(db, key, UserPatch::new().text("role", role.to_string())).await
    }

    /// Stores the hash of a refresh token.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn store_refresh_token(
        db: &Database,
        user_id: &str,
        token_hash: String,
        expires_at: String,
        created_at: String,
    ) -> Result<(), DatabaseError> {
        let row = StoredRefreshToken { token_hash, user_id: user_id.to_owned(), expires_at, created_at };
        db.query("CREATE refresh_token CONTENT $row RETURN NONE")
            .bind(("row", row))
            .await
            .context("Storing refresh token")?
            .check()
            .context("Storing refresh token")?;
        Ok(())
    }

    /// # Errors
    /// Storage failures.
    pub async fn find_refresh_token(
        db: &Database,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let mut rows: Vec<RefreshTokenRecord> = db
            .query("SELECT user_id, expires_at FROM refresh_token WHERE token_hash = $hash LIMIT 1")
            .bind(("hash", token_hash.to_owned()))
            .await
            .context("Loading refresh token")?
            .take(0)
            .context("Decoding refresh token")?;
        Ok(rows.pop())
    }

    /// # Errors
    /// Storage failures.
    pub async fn delete_refresh_token(db: &Database, token_hash: &str) -> Result<(), DatabaseError> {
        db.query("DELETE refresh_token WHERE token_hash = $hash")
            .bind(("hash", token_hash.to_owned()))
            .await
            .context("Deleting refresh token")?
            .check()
            .context("Deleting refresh token")?;
        Ok(())
    }

    /// Drops every refresh token of `user_id`.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn revoke_refresh_tokens(db: &Database, user_id: &str) -> Result<(), DatabaseError> {
        db.query("DELETE refresh_token WHERE user_id = $user")
            .bind(("user", user_id.to_owned()))
            .await
            .context("Revoking refresh tokens")?
            .check()
            .context("Revoking refresh tokens")?;
        Ok(())
    }
}
