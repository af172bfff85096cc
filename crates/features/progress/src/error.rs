use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_kernel::server::ApiError;

#[trai_derive::trai_error]
pub enum ProgressError {
    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Progress storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
