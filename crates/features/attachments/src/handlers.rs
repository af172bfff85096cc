use crate::dto::{AttachmentUrl, AttachmentView, UploadForm};
use crate::error::AttachmentsError;
use crate::policy;
use crate::repository::{AttachmentRecord, AttachmentStore};
use crate::Attachments;
use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use std::str::FromStr;
use tracing::{info, warn};
use trai_derive::api_handler;
use trai_domain::constants::ATTACHMENTS_TAG;
use trai_domain::enums::EntityType;
use trai_identity::CurrentUser;
use trai_kernel::server::{ApiError, ApiState};
use trai_kernel::{safe_nanoid, time};

#[api_handler(
    post,
    path = "/attachments/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = CREATED, description = "Stored and linked", body = AttachmentView),
        (status = BAD_REQUEST, description = "Unknown entity type"),
        (status = PAYLOAD_TOO_LARGE, description = "Larger than 10 MB"),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "Not JPEG, PNG, GIF or PDF"),
    ),
    security(("bearer" = [])),
    tag = ATTACHMENTS_TAG,
)]
pub(crate) async fn upload(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AttachmentView>), ApiError> {
    let slice = slice(&state)?;

    let mut file = None;
    let mut entity_type = None;
    let mut entity_id = None;
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("file").to_owned();
                let content_type =
                    field.content_type().unwrap_or("application/octet-stream").to_owned();
                let (bytes, size) = read_capped(field, slice.max_bytes).await?;
                file = Some((filename, content_type, bytes, size));
            },
            Some("entity_type") => entity_type = Some(field.text().await?),
            Some("entity_id") => entity_id = Some(field.text().await?),
            _ => {},
        }
    }

    let (filename, content_type, bytes, size) =
        file.ok_or_else(|| ApiError::unprocessable("Field 'file' is required"))?;
    let entity_type = parse_entity(entity_type.as_deref().unwrap_or_default())?;
    let entity_id = entity_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::unprocessable("Field 'entity_id' is required"))?;
    policy::check(&content_type, size, slice.max_bytes)?;

    let object_key = policy::object_key(&filename);
    slice.store.put(&object_key, &bytes, &content_type).await.map_err(AttachmentsError::from)?;

    let record = AttachmentRecord {
        key: safe_nanoid!(),
        user_id: user.key.clone(),
        entity_type: entity_type.to_string(),
        entity_id,
        filename,
        object_key,
        content_type,
        size: i64::try_from(size).unwrap_or(i64::MAX),
        created_at: time::now_stamp(),
    };
    if let Err(err) = AttachmentStore::create(&state.database, record.clone()).await {
        if let Err(cleanup) = slice.store.delete(&record.object_key).await {
            warn!(key = %record.object_key, error = %cleanup, "Orphaned object left behind");
        }
        return Err(AttachmentsError::from(err).into());
    }

    info!(
        user = %user.key,
        attachment = %record.key,
        backend = slice.store.backend(),
        size = record.size,
        "Attachment uploaded"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[api_handler(
    get,
    path = "/attachments/entity/{entity_type}/{entity_id}",
    params(
        ("entity_type" = String, Path, description = "user, workout or progress"),
        ("entity_id" = String, Path, description = "Entity id"),
    ),
    responses(
        (status = OK, description = "Attachments of the entity, oldest first", body = Vec<AttachmentView>),
        (status = BAD_REQUEST, description = "Unknown entity type"),
    ),
    security(("bearer" = [])),
    tag = ATTACHMENTS_TAG,
)]
pub(crate) async fn list_for_entity(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<AttachmentView>>, ApiError> {
    let entity_type = parse_entity(&entity_type)?;
    let owner = (!user.role().is_admin()).then_some(user.key.as_str());
    let rows = AttachmentStore::for_entity(&state.database, entity_type.as_ref(), &entity_id, owner)
        .await
        .map_err(AttachmentsError::from)?;
    Ok(Json(rows.into_iter().map(AttachmentView::from).collect()))
}

#[api_handler(
    get,
    path = "/attachments/{attachment_id}/url",
    params(("attachment_id" = String, Path, description = "Attachment id")),
    responses(
        (status = OK, description = "Temporary download URL", body = AttachmentUrl),
        (status = FORBIDDEN, description = "Someone else's attachment"),
        (status = NOT_FOUND, description = "No such attachment"),
    ),
    security(("bearer" = [])),
    tag = ATTACHMENTS_TAG,
)]
pub(crate) async fn download_url(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(attachment_id): Path<String>,
) -> Result<Json<AttachmentUrl>, ApiError> {
    let slice = slice(&state)?;
    let record = accessible(&state, &user, &attachment_id).await?;
    let url = slice
        .store
        .presigned_get(&record.object_key, slice.url_ttl)
        .await
        .map_err(AttachmentsError::from)?;
    Ok(Json(AttachmentUrl {
        url,
        expires_in: u32::try_from(slice.url_ttl.as_secs()).unwrap_or(u32::MAX),
        filename: record.filename,
    }))
}

#[api_handler(
    delete,
    path = "/attachments/{attachment_id}",
    params(("attachment_id" = String, Path, description = "Attachment id")),
    responses(
        (status = NO_CONTENT, description = "Object and row removed"),
        (status = FORBIDDEN, description = "Someone else's attachment"),
        (status = NOT_FOUND, description = "No such attachment"),
    ),
    security(("bearer" = [])),
    tag = ATTACHMENTS_TAG,
)]
pub(crate) async fn delete_attachment(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(attachment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let slice = slice(&state)?;
    let record = accessible(&state, &user, &attachment_id).await?;
    slice.store.delete(&record.object_key).await.map_err(AttachmentsError::from)?;
    AttachmentStore::delete(&state.database, &record.key).await.map_err(AttachmentsError::from)?;
    info!(user = %user.key, attachment = %record.key, "Attachment deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn slice(state: &ApiState) -> Result<&Attachments, ApiError> {
    state.try_get_slice::<Attachments>().map_err(|e| ApiError::from_error(500, &e))
}

async fn accessible(
    state: &ApiState,
    user: &trai_identity::UserRecord,
    attachment_id: &str,
) -> Result<AttachmentRecord, ApiError> {
    let record = AttachmentStore::find(&state.database, attachment_id)
        .await
        .map_err(AttachmentsError::from)?
        .ok_or(AttachmentsError::NotFound { context: None })?;
    if !record.visible_to(&user.key, user.role().is_admin()) {
        return Err(AttachmentsError::Forbidden { context: None }.into());
    }
    Ok(record)
}

fn parse_entity(raw: &str) -> Result<EntityType, ApiError> {
    EntityType::from_str(raw.trim()).map_err(|_| {
        AttachmentsError::BadRequest {
            message: "entity_type must be one of: user, workout, progress".into(),
            context: None,
        }
        .into()
    })
}

/// Reads at most `limit + 1` bytes; a returned size above `limit` means the
/// rest of the field was skipped.
async fn read_capped(mut field: Field<'_>, limit: u64) -> Result<(Vec<u8>, u64), ApiError> {
    let mut bytes = Vec::new();
    let mut size = 0_u64;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        if size > limit {
            return Ok((Vec::new(), size));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok((bytes, size))
}
