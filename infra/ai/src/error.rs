use std::borrow::Cow;

#[trai_derive::trai_error]
pub enum AiError {
    /// Transport failure other than a timeout.
    #[error("AI request failed{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("AI request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Non-200 answer from the provider.
    #[error("AI provider returned {status}: {message}")]
    Status { status: u16, message: Cow<'static, str> },

    /// Reply arrived but did not have the expected shape.
    #[error("Invalid AI response{}: {message}", format_context(.context))]
    InvalidResponse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal AI error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
