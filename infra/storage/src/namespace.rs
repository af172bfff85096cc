use crate::engine::Storage;
use crate::error::StorageError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(pub String);

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_lowercase();

        if name.is_empty() {
            return Err(StorageError::PathTraversalAttempt {
                message: "EMPTY".into(),
                context: Some("Namespace cannot be empty".into()),
            });
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::PathTraversalAttempt {
                message: name.into(),
                context: Some("Namespace contains illegal characters".into()),
            });
        }

        Ok(Self(name))
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// View of [`Storage`] confined to one top-level directory.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: Arc<str>,
}

impl NamespacedStorage {
    pub(crate) fn new(storage: Storage, namespace: String) -> Self {
        Self { storage, namespace: namespace.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// Physical location of `path` inside this namespace.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] if the path leaves the sandbox.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.storage.locate(Some(&self.namespace), path)
    }

    /// # Errors
    /// See [`Storage::read`].
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.storage.read_in(Some(&self.namespace), path).await
    }

    /// # Errors
    /// See [`Storage::write`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write_in(Some(&self.namespace), path, data).await
    }

    /// # Errors
    /// See [`Storage::delete`].
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.storage.delete_in(Some(&self.namespace), path).await
    }

    /// # Errors
    /// Only when the path fails sandbox validation.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    /// # Errors
    /// See [`Storage::metadata`].
    pub async fn metadata(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        self.storage.metadata_in(Some(&self.namespace), path).await
    }
}
