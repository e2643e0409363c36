use std::borrow::Cow;

/// Errors a bridged operation can settle with.
#[courier_derive::courier_error]
pub enum BridgeError {
    /// The external provider reported a failure through its failure callback.
    #[error("Remote call failed{}: {}", format_context(.context), describe_remote(.code, .message))]
    Remote {
        code: Option<Cow<'static, str>>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A stored blob could not be decoded into the requested shape.
    #[error("Malformed payload{}: {source}", format_context(.context))]
    Deserialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// A value could not be encoded before it was sent.
    #[error("Serialization failed{}: {message}", format_context(.context))]
    Serialize { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The operation was cancelled before it settled.
    #[error("Operation cancelled{}: {message}", format_context(.context))]
    Cancelled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No settlement arrived before the deadline.
    #[error("Operation timed out{}: {message}", format_context(.context))]
    TimedOut { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Every completer was dropped while the operation was still pending.
    #[error("Operation abandoned{}: {message}", format_context(.context))]
    Abandoned { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal bridge error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl BridgeError {
    /// Returns `true` for failures reported by the external provider.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns the provider's diagnostic code of a remote failure, if any.
    #[must_use]
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn describe_remote(code: &Option<Cow<'static, str>>, message: &str) -> String {
    code.as_ref().map_or_else(|| message.to_owned(), |code| format!("[{code}] {message}"))
}
