//! # Storage
//!
//! File storage for TrAi uploads.
//!
//! - **[`Storage`]**: sandboxed engine rooted at one directory. Paths cannot escape
//!   the root, writes are atomic (temp file, `fsync`, rename) and stale temp files
//!   are purged on connect.
//! - **[`NamespacedStorage`]**: the same engine confined to one subdirectory,
//!   optionally spread over `ab/cd/` shard directories.
//! - **[`ObjectStore`]**: put/delete/presign seam with [`S3Store`] (S3/MinIO via
//!   `rust-s3`) and [`LocalStore`] (files under the served static tree).
//!
//! ```rust
//! use std::time::Duration;
//! use trai_storage::{LocalStore, ObjectStore, Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let statics = Storage::builder().root(tmp.path()).sharded(false).connect().await?;
//!     let store = LocalStore::new(&statics, "/static")?;
//!     store.ensure_bucket().await?;
//!
//!     store.put("a1b2.png", b"png", "image/png").await?;
//!     let url = store.presigned_get("a1b2.png", Duration::from_secs(3600)).await?;
//!     assert_eq!(url, "/static/objects/a1b2.png");
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod objects;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use namespace::{NamespaceName, NamespacedStorage};
pub use objects::{LocalStore, ObjectStore, S3Settings, S3Store, validate_key};
