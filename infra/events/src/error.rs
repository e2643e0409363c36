use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[courier_derive::courier_error]
pub enum EventBusError {
    /// Occurs when an internal dynamic cast fails.
    /// This usually indicates an invariant violation in the topic registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// One or more listeners reported a failure during a publish.
    /// The remaining listeners of that publish still ran.
    #[error("Listener failed{}: {message}", format_context(.context))]
    ListenerFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
