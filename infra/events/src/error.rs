use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[trai_derive::trai_error]
pub enum EventBusError {
    /// The registry holds a sender of another type under this `TypeId`.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No Tokio runtime to run a listener on.
    #[error("Listener spawn failed{}: {message}", format_context(.context))]
    Spawn { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
