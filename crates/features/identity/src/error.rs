use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_kernel::server::ApiError;

#[trai_derive::trai_error]
pub enum IdentityError {
    /// Slice misconfiguration detected at start-up.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(401)]
    #[error("{message}")]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token signing failed{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },

    #[error("Password hashing failed{}: {source}", format_context(.context))]
    Hash { source: bcrypt::BcryptError, context: Option<Cow<'static, str>> },

    #[error("Identity storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}
