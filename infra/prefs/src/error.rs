use std::borrow::Cow;

/// A specialized [`PrefsError`] enum of this crate.
#[courier_derive::courier_error]
pub enum PrefsError {
    #[error("Preferences I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Preferences file is corrupt{}: {source}", format_context(.context))]
    Corrupt { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal preferences error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
