use std::borrow::Cow;
use trai_derive::trai_error;

#[trai_error]
pub enum DemoError {
    #[status(404)]
    #[error("{message}")]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(403)]
    #[error("{message}")]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let missing = DemoError::NotFound { message: "Workout not found".into(), context: None };
    assert_eq!(missing.http_status(), 404);
    assert_eq!(missing.to_string(), "Workout not found");

    let denied = DemoError::Forbidden { message: "Access denied".into(), context: None };
    assert_eq!(denied.http_status(), 403);

    let internal: DemoError = String::from("boom").into();
    assert_eq!(internal.http_status(), 500);
}
