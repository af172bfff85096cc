use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct StorageConfig {
    create: bool,
    sharded: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { create: true, sharded: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    /// Creates the root directory on connect (default `true`).
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Spreads files over `ab/cd/` shard directories (default `true`).
    ///
    /// Turn off when the tree is served as-is, e.g. under `/static`.
    #[must_use]
    pub const fn sharded(mut self, enable: bool) -> Self {
        self.config.sharded = enable;
        self
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        StorageBuilder { state: WithRoot(path.into()), config: self.config }
    }
}

impl StorageBuilder<WithRoot> {
    /// Creates (optionally) and canonicalizes the root, then purges stale temp files.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] if the root is missing with `create(false)`, or cannot be
    /// created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;
        info!(path = %canonical.display(), sharded = self.config.sharded, "Storage root ready");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                sharded: self.config.sharded,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        Ok(storage)
    }
}
