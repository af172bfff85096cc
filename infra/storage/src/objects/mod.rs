//! Object stores for user uploads.
//!
//! [`ObjectStore`] is the seam the attachment slice depends on; production uses
//! [`S3Store`] against MinIO or S3, single-node and test setups use [`LocalStore`].

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::{S3Settings, S3Store};

use crate::error::StorageError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

#[async_trait]
pub trait ObjectStore: Debug + Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    /// Creates the target bucket or directory when it does not exist.
    async fn ensure_bucket(&self) -> Result<(), StorageError>;

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Removing a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// URL a client can GET the object from for at least `ttl`.
    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}

/// Keys are flat file names: `[A-Za-z0-9._-]`, no leading dot, at most 255 bytes.
///
/// # Errors
/// [`StorageError::InvalidKey`] otherwise.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.len() <= 255
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey { message: key.to_owned().into(), context: None })
    }
}
