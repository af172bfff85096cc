//! Attachments slice: files linked to a user, a workout or a progress entry.
//!
//! Bytes go to an [`ObjectStore`]: S3/MinIO when `storage.s3` is configured,
//! otherwise the served static tree. Rows in `attachment` keep the owner and the
//! object key. Objects of a deleted account are purged when
//! [`UserDeleted`] arrives on the event bus.

mod dto;
mod error;
mod handlers;
mod policy;
mod repository;

pub use dto::{AttachmentUrl, AttachmentView};
pub use error::{AttachmentsError, AttachmentsErrorExt};
pub use policy::{ALLOWED_TYPES, MAX_FILE_BYTES, check, object_key};
pub use repository::{AttachmentRecord, AttachmentStore};

use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use trai_database::Migration;
use trai_domain::config::StorageConfig;
use trai_domain::constants::STATIC_PREFIX;
use trai_domain::events::UserDeleted;
use trai_event_bus::EventBus;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use trai_storage::{LocalStore, ObjectStore, S3Settings, S3Store, Storage};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("attachments", "0001", include_str!("../migrations/0001_attachments.surql"))];

/// Request ceiling for the upload route; the per-file limit is enforced while streaming.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[trai_derive::trai_slice]
pub struct Attachments {
    pub store: Arc<dyn ObjectStore>,
    pub max_bytes: u64,
    pub url_ttl: Duration,
}

/// Picks the object store for `cfg` and makes sure its bucket exists.
///
/// An unreachable S3 endpoint is logged and retried implicitly by the first upload.
///
/// # Errors
/// [`AttachmentsError::Storage`] when the store cannot be built.
pub async fn object_store(cfg: &StorageConfig) -> Result<Arc<dyn ObjectStore>, AttachmentsError> {
    let store: Arc<dyn ObjectStore> = match &cfg.s3 {
        Some(s3) => Arc::new(S3Store::new(&S3Settings {
            endpoint: s3.endpoint.clone(),
            access_key: s3.access_key.clone(),
            secret_key: s3.secret_key.clone(),
            bucket: s3.bucket.clone(),
            region: s3.region.clone(),
            secure: s3.endpoint.starts_with("https://"),
        })?),
        None => {
            let statics = Storage::builder().root(&cfg.static_dir).sharded(false).connect().await?;
            Arc::new(LocalStore::new(&statics, STATIC_PREFIX)?)
        },
    };

    if let Err(err) = store.ensure_bucket().await {
        warn!(backend = store.backend(), error = %err, "Object store not ready");
    }
    Ok(store)
}

/// Deletes the objects listed in every [`UserDeleted`] event.
///
/// # Errors
/// [`AttachmentsError::Events`] outside a Tokio runtime.
pub fn purge_on_user_deleted(
    events: &EventBus,
    store: Arc<dyn ObjectStore>,
) -> Result<JoinHandle<()>, AttachmentsError> {
    let handle = events.listen::<UserDeleted, _, _>(move |event| {
        let store = Arc::clone(&store);
        async move {
            let mut removed = 0_usize;
            for key in &event.object_keys {
                match store.delete(key).await {
                    Ok(()) => removed += 1,
                    Err(err) => warn!(user = %event.user_id, %key, error = %err, "Object purge failed"),
                }
            }
            info!(user = %event.user_id, removed, "Attachments of deleted account purged");
        }
    })?;
    Ok(handle)
}

/// # Errors
/// Store construction or listener registration failures.
pub async fn init(cfg: &StorageConfig, events: &EventBus) -> Result<InitializedSlice, AttachmentsError> {
    let store = object_store(cfg).await?;
    purge_on_user_deleted(events, Arc::clone(&store))?;
    info!(backend = store.backend(), "Attachments slice initialized");

    Ok(InitializedSlice::new(Attachments::new(AttachmentsInner {
        store,
        max_bytes: cfg.max_upload_bytes,
        url_ttl: Duration::from_secs(u64::from(cfg.presign_ttl_secs)),
    })))
}

/// `/attachments/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::upload))
        .routes(routes!(handlers::list_for_entity))
        .routes(routes!(handlers::download_url))
        .routes(routes!(handlers::delete_attachment))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
