use courier_bridge::BridgeError;
use courier_prefs::PrefsError;
use std::borrow::Cow;

/// A specialized [`AccountError`] enum of this crate.
#[courier_derive::courier_error]
pub enum AccountError {
    /// A remote call failed, was cancelled, timed out, or returned malformed data.
    #[error("Account request failed{}: {source}", format_context(.context))]
    Bridge { source: BridgeError, context: Option<Cow<'static, str>> },

    /// The local identity slot could not be read or written.
    #[error("Local identity error{}: {source}", format_context(.context))]
    Preferences { source: PrefsError, context: Option<Cow<'static, str>> },

    /// The client is missing required configuration.
    #[error("Account config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Input rejected before any remote call was made.
    #[error("Invalid input{}: {message}", format_context(.context))]
    InvalidInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal account error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AccountError {
    /// The provider's diagnostic code when the failure came from the remote side.
    #[must_use]
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::Bridge { source, .. } => source.remote_code(),
            _ => None,
        }
    }
}
