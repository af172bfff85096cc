use std::borrow::Cow;
use trai_ai::AiError;
use trai_database::DatabaseError;
use trai_kernel::server::ApiError;
use trai_storage::StorageError;

#[trai_derive::trai_error]
pub enum ProfileError {
    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("User not found")]
    UserNotFound { context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(503)]
    #[error("AI service is not configured")]
    AiUnavailable { context: Option<Cow<'static, str>> },

    #[error("AI tips generation failed{}: {source}", format_context(.context))]
    Ai { source: AiError, context: Option<Cow<'static, str>> },

    #[error("Avatar storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Profile storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
