use trai_derive::trai_error;

#[trai_error]
pub enum DemoError {
    #[status(42)]
    #[error("{message}")]
    Odd { message: String },
}

fn main() {}
