//! # Database
//!
//! [SurrealDB](https://surrealdb.com) bootstrap for TrAi.
//!
//! - Any engine URL the `any` connector understands (`mem://`, `rocksdb://`, `ws://`, `http://`).
//! - Health check with exponential back-off while the engine warms up.
//! - Versioned per-slice migrations, recorded with a sha256 checksum.
//!
//! ```rust
//! use trai_database::{Database, DatabaseError, Migration};
//!
//! const GOALS: Migration = Migration::new("goals", "0001", "DEFINE TABLE goal SCHEMALESS;");
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("trai", "core")
//!         .migrations([GOALS])
//!         .init()
//!         .await?;
//!
//!     let _version = db.version().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::{AppliedMigration, Migration, MigrationReport};

use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_INITIAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// Shared handle to the selected namespace and database.
///
/// Dereferences to the underlying [`Surreal`] client.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }

    /// Applies `migrations` in order on an open connection.
    ///
    /// Already recorded versions are skipped once their checksum matches.
    ///
    /// # Errors
    /// [`DatabaseError::Migration`] for duplicate keys, checksum drift or a failing script.
    pub async fn migrate(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        let report = MigrationRunner::new(&self.inner.instance).run(migrations).await?;
        for skipped in &report.skipped {
            debug!(slice = %skipped.slice, version = %skipped.version, "Migration already applied");
        }
        for applied in &report.applied {
            info!(slice = %applied.slice, version = %applied.version, "Applied migration");
        }
        Ok(report)
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Signs in as a root user after connecting.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Appends migrations to run once the session is active.
    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Connects, waits for the engine, signs in, selects the session and migrates.
    ///
    /// Health is probed up to three times, doubling the delay from 500ms.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if URL, namespace or database is missing.
    /// * [`DatabaseError::Connection`] if the engine fails to start or stays unhealthy.
    /// * [`DatabaseError::Auth`] if the root credentials are rejected.
    /// * [`DatabaseError::Surreal`] if `use_ns`/`use_db` fails.
    /// * [`DatabaseError::Migration`] if a migration cannot be applied.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self
            .url
            .ok_or(DatabaseError::Validation { message: "URL is required".into(), context: None })?;
        let ns = self.ns.ok_or(DatabaseError::Validation {
            message: "Namespace is required".into(),
            context: None,
        })?;
        let db = self.db.ok_or(DatabaseError::Validation {
            message: "Database is required".into(),
            context: None,
        })?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = HEALTH_INITIAL_DELAY;
        for attempt in 1..=HEALTH_ATTEMPTS {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == HEALTH_ATTEMPTS {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username, password }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        let database = Database { inner: Arc::new(DatabaseInner { instance, ns, db }) };

        if !self.migrations.is_empty() {
            database.migrate(&self.migrations).await?;
        }

        Ok(database)
    }
}
