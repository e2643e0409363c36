use courier_derive::courier_error;

#[courier_error]
pub enum DemoError {
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<String>,
    },
}

fn main() {}
