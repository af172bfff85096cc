use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

const BOOTSTRAP: &str = "DEFINE TABLE IF NOT EXISTS migration SCHEMALESS;
DEFINE INDEX IF NOT EXISTS migration_slice_version ON migration FIELDS slice, version UNIQUE;";

/// One versioned schema script owned by a feature slice.
///
/// Scripts run inside a transaction together with the bookkeeping record,
/// so a failing script leaves no trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex-encoded sha256 of the script text.
    #[must_use]
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.script.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }

    fn to_applied(self) -> AppliedMigration {
        AppliedMigration {
            slice: self.slice.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

/// Outcome of one migration pass.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, Clone, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct AppliedMigration {
    pub slice: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(
        &self,
        migrations: &[Migration],
    ) -> Result<MigrationReport, DatabaseError> {
        ensure_unique(migrations)?;

        self.db
            .query(BOOTSTRAP)
            .await
            .context("Preparing migration table")?
            .check()
            .map_err(surrealdb::Error::from)?;

        let applied = self.applied_map().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            if let Some(existing) = applied.get(&migration.key()) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{ slice: $slice, version: $version, checksum: $checksum, applied_at: time::now() }};
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice.to_owned()))
            .bind(("version", migration.version.to_owned()))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("SQL execution failed at {}", migration.key()))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                message: e.to_string().into(),
                context: Some(migration.key().into()),
            })?;

        Ok(())
    }

    async fn applied_map(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_unique(migrations: &[Migration]) -> Result<(), DatabaseError> {
    let mut seen = FxHashMap::default();
    for migration in migrations {
        if seen.insert(migration.key(), ()).is_some() {
            return Err(DatabaseError::Migration {
                message: format!("Duplicate migration {}", migration.key()).into(),
                context: None,
            });
        }
    }
    Ok(())
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let current = migration.checksum();
    if existing != current {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {existing}, found {current})",
                migration.key()
            )
            .into(),
            context: Some("Migration already applied with different contents".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_hex_sha256() {
        let m = Migration::new("goals", "0001", "");
        assert_eq!(
            m.checksum(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let m = Migration::new("goals", "0001", "DEFINE TABLE goal;");
        let err = ensure_checksum_match(&m, "deadbeef").expect_err("mismatch");
        assert!(matches!(err, DatabaseError::Migration { .. }));
        assert!(ensure_checksum_match(&m, &m.checksum()).is_ok());
    }

    #[test]
    fn duplicates_are_rejected() {
        let m = Migration::new("goals", "0001", "");
        assert!(ensure_unique(&[m, m]).is_err());
        assert!(ensure_unique(&[m, Migration::new("goals", "0002", "")]).is_ok());
    }
}
