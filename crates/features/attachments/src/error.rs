use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_event_bus::EventBusError;
use trai_kernel::server::ApiError;
use trai_storage::StorageError;

#[trai_derive::trai_error]
pub enum AttachmentsError {
    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(403)]
    #[error("Access denied")]
    Forbidden { context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("Attachment not found")]
    NotFound { context: Option<Cow<'static, str>> },

    #[status(413)]
    #[error("File size exceeds {limit_mb} MB limit")]
    TooLarge { limit_mb: u64 },

    #[status(415)]
    #[error("File type '{content_type}' is not allowed. Allowed: JPEG, PNG, GIF, PDF")]
    UnsupportedType { content_type: String },

    #[error("Object store error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Attachment storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Event subscription failed{}: {source}", format_context(.context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },
}

impl From<AttachmentsError> for ApiError {
    fn from(err: AttachmentsError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
