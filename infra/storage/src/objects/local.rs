use super::{ObjectStore, validate_key};
use crate::engine::Storage;
use crate::error::StorageError;
use crate::namespace::NamespacedStorage;
use async_trait::async_trait;
use std::time::Duration;

/// Objects kept as plain files under `<static root>/objects/`.
///
/// The static tree is served by the HTTP layer, so the "presigned" URL is the
/// public path `<url_prefix>/<key>` and `ttl` is ignored.
#[derive(Debug, Clone)]
pub struct LocalStore {
    objects: NamespacedStorage,
    url_prefix: String,
}

impl LocalStore {
    pub const NAMESPACE: &'static str = "objects";

    /// `storage` should be unsharded so keys map 1:1 onto served paths.
    ///
    /// # Errors
    /// Never in practice: the namespace name is a valid constant.
    pub fn new(storage: &Storage, url_prefix: impl Into<String>) -> Result<Self, StorageError> {
        let prefix = url_prefix.into();
        Ok(Self {
            objects: storage.namespace(Self::NAMESPACE)?,
            url_prefix: format!("{}/{}", prefix.trim_end_matches('/'), Self::NAMESPACE),
        })
    }

    /// # Errors
    /// See [`NamespacedStorage::read`].
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        self.objects.read(key).await
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let dir = self.objects.resolve("probe")?;
        if let Some(parent) = dir.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| StorageError::Io {
                source,
                context: Some("Creating local object directory".into()),
            })?;
        }
        Ok(())
    }

    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects.write(key, bytes).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        match self.objects.delete(key).await {
            Ok(()) | Err(StorageError::FileNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn presigned_get(&self, key: &str, _ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        Ok(format!("{}/{key}", self.url_prefix))
    }
}
