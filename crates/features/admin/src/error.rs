use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_event_bus::EventBusError;
use trai_kernel::server::ApiError;

#[trai_derive::trai_error]
pub enum AdminError {
    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("User not found")]
    UserNotFound { context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Admin storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Event publishing failed{}: {source}", format_context(.context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
