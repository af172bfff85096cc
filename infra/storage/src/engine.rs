//! Sandboxed, atomic file I/O rooted at one directory.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::{self, TMP_MARKER};
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct StorageInner {
    /// Canonical physical root.
    pub(crate) root: PathBuf,
    pub(crate) sharded: bool,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply clonable handle to the storage engine.
///
/// Every path is checked against the sandbox root, writes go through a
/// temp file + `fsync` + rename so readers never observe a torn file.
///
/// ```rust
/// use trai_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let storage = Storage::builder().root(tmp.path()).sharded(false).connect().await?;
///
///     let avatars = storage.namespace("avatars")?;
///     avatars.write("user_42.png", b"png").await?;
///     assert_eq!(avatars.read("user_42.png").await?, b"png");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Scoped view under `<root>/<name>/`.
    ///
    /// Names are lowercased and limited to `[a-z0-9_]`.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] for empty or illegal names.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        Ok(NamespacedStorage::new(self.clone(), ns.0))
    }

    /// Resolves a root-relative path without applying the shard layout.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] if the path leaves the sandbox.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.inner.root, path)
    }

    pub(crate) fn locate(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        security::resolve_layout(&self.inner.root, namespace, path, self.inner.sharded)
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when missing, [`StorageError::Io`] otherwise.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.read_in(None, path).await
    }

    pub(crate) async fn read_in(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u8>, StorageError> {
        let resolved = self.locate(namespace, path)?;
        fs::read(&resolved).await.map_err(|err| not_found_or_io(err, &resolved, "Read failed"))
    }

    /// Atomically replaces the file at `path` with `data`.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox,
    /// [`StorageError::Io`] on disk failures.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.write_in(None, path, data).await
    }

    pub(crate) async fn write_in(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = self.locate(namespace, path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {}", resolved.display()))?;
        }

        let temp = self.tmp_path(&resolved);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            if err.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Atomic swap failed: {}", resolved.display()).into()),
                });
            }
            // platforms without atomic replace
            fs::remove_file(&resolved)
                .await
                .context(format!("Failed to replace existing file: {}", resolved.display()))?;
            fs::rename(&temp, &resolved)
                .await
                .context(format!("Atomic swap failed: {}", resolved.display()))?;
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File saved atomically");
        Ok(())
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when the file is already gone.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.delete_in(None, path).await
    }

    pub(crate) async fn delete_in(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let resolved = self.locate(namespace, path)?;
        fs::remove_file(&resolved)
            .await
            .map_err(|err| not_found_or_io(err, &resolved, "Failed to delete"))?;
        debug!(path = %resolved.display(), "File deleted");
        Ok(())
    }

    /// # Errors
    /// Only when the path fails sandbox validation.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.locate(None, path)?.exists())
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when missing, [`StorageError::Io`] otherwise.
    pub async fn metadata(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        self.metadata_in(None, path).await
    }

    pub(crate) async fn metadata_in(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        let resolved = self.locate(namespace, path)?;
        fs::metadata(&resolved)
            .await
            .map_err(|err| not_found_or_io(err, &resolved, "Failed to get metadata"))
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root).await;
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
        target.with_file_name(format!("{file_name}{TMP_MARKER}{n}"))
    }
}

fn not_found_or_io(err: std::io::Error, path: &Path, what: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::FileNotFound { message: path.display().to_string().into(), context: None }
    } else {
        StorageError::Io { source: err, context: Some(format!("{what}: {}", path.display()).into()) }
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}
