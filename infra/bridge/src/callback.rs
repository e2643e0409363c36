use crate::completion::{Pending, pending};
use crate::error::BridgeError;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Success continuation handed to a callback-style provider.
pub type OnSuccess<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Failure continuation handed to a callback-style provider.
pub type OnFailure = Box<dyn FnOnce(ErrorInfo) + Send + 'static>;

/// Failure payload delivered by an external provider.
///
/// `details` carries per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: Option<Cow<'static, str>>,
    pub message: Cow<'static, str>,
    pub details: BTreeMap<String, Vec<String>>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self { code: None, message: message.into(), details: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.details.entry(field.into()).or_default().push(message.into());
        self
    }

    /// Human-readable report: the message followed by every detail line.
    #[must_use]
    pub fn report(&self) -> String {
        let mut report = self.message.to_string();
        for (field, messages) in &self.details {
            for message in messages {
                report.push_str(&format!("\n{field}: {message}"));
            }
        }
        report
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.report()),
            None => f.write_str(&self.report()),
        }
    }
}

impl From<ErrorInfo> for BridgeError {
    fn from(info: ErrorInfo) -> Self {
        let message = info.report().into();
        Self::Remote { code: info.code, message, context: None }
    }
}

/// Adapts a two-callback remote call into an awaitable [`Pending`].
///
/// `invoke` receives the request together with a success and a failure
/// continuation. Whichever continuation runs first settles the result; a
/// second invocation of either is ignored. If `invoke` drops both without
/// calling them, the result settles with [`BridgeError::Abandoned`].
///
/// The continuations are `Send` and may be called from any thread.
///
/// # Examples
/// ```rust
/// use courier_bridge::callback::{ErrorInfo, call};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let doubled = call(21_u32, |n, on_success, _on_failure| on_success(n * 2)).await;
/// assert_eq!(doubled.unwrap(), 42);
///
/// let failed = call((), |(), _on_success: Box<dyn FnOnce(u32) + Send>, on_failure| {
///     on_failure(ErrorInfo::new("quota exceeded").with_code("LimitExceeded"));
/// })
/// .await;
/// assert_eq!(failed.unwrap_err().remote_code(), Some("LimitExceeded"));
/// # }
/// ```
pub fn call<Req, T, F>(request: Req, invoke: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce(Req, OnSuccess<T>, OnFailure),
{
    let (completer, handle) = pending::<T>();
    let on_failure = completer.clone();

    invoke(
        request,
        Box::new(move |value| {
            completer.resolve(value);
        }),
        Box::new(move |info| {
            on_failure.reject(info.into());
        }),
    );
    handle
}
