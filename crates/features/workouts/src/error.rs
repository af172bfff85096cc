use std::borrow::Cow;
use trai_ai::AiError;
use trai_database::DatabaseError;
use trai_kernel::server::ApiError;

#[trai_derive::trai_error]
pub enum WorkoutsError {
    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(403)]
    #[error("Monthly limit of {limit} AI workouts reached. Upgrade to Pro for unlimited generations")]
    QuotaExceeded { limit: i64 },

    #[status(404)]
    #[error("Workout not found")]
    NotFound { context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(503)]
    #[error("AI service is not configured")]
    AiUnavailable { context: Option<Cow<'static, str>> },

    /// Generation failed upstream; reported as a plain 500.
    #[error("Workout generation failed{}: {source}", format_context(.context))]
    Ai { source: AiError, context: Option<Cow<'static, str>> },

    #[error("Workout storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

impl From<WorkoutsError> for ApiError {
    fn from(err: WorkoutsError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
