use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_kernel::server::ApiError;

#[trai_derive::trai_error]
pub enum NutritionError {
    #[status(404)]
    #[error("{message}")]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(503)]
    #[error("{message}")]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Food database client error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Nutrition storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

impl From<NutritionError> for ApiError {
    fn from(err: NutritionError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
