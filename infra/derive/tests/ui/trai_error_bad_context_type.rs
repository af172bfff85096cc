use trai_derive::trai_error;

#[trai_error]
pub enum DemoError {
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<String>,
    },
}

fn main() {}
