use crate::repository::AttachmentRecord;
use trai_derive::api_model;

#[api_model]
pub struct AttachmentView {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: String,
}

impl From<AttachmentRecord> for AttachmentView {
    fn from(record: AttachmentRecord) -> Self {
        Self {
            id: record.key,
            filename: record.filename,
            content_type: record.content_type,
            size: record.size,
            created_at: record.created_at,
        }
    }
}

#[api_model]
pub struct AttachmentUrl {
    pub url: String,
    /// Seconds.
    pub expires_in: u32,
    pub filename: String,
}

/// Multipart body of `POST /attachments/upload`; documentation only.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub(crate) struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// `user`, `workout` or `progress`.
    pub entity_type: String,
    pub entity_id: String,
}
