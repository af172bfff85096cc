use std::borrow::Cow;

#[trai_derive::trai_error]
pub enum StorageError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Object keys must be a single file name.
    #[error("Invalid object key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Remote object store (S3/MinIO) rejected or failed a request.
    #[error("Object store failure{}: {message}", format_context(.context))]
    Remote { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
