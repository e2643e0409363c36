use crate::bus::Event;
use std::fmt;
use std::sync::Arc;

/// Error type a fallible listener may return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single listener invocation.
pub type ListenerResult = Result<(), ListenerError>;

type Callback<T> = dyn Fn(&T) -> ListenerResult + Send + Sync;

/// A shareable handle to a callable registered on the [`EventBus`](crate::EventBus).
///
/// Two handles are equal when they were cloned from the same original, so the
/// same `Listener` value can be passed to both `subscribe` and `unsubscribe`.
/// Independently constructed listeners are never equal, even if they wrap
/// identical closures.
///
/// # Examples
/// ```rust
/// use courier_event_bus::Listener;
///
/// struct Ping;
///
/// let listener = Listener::new(|_: &Ping| {});
/// let same = listener.clone();
/// assert_eq!(listener, same);
/// assert_ne!(listener, Listener::new(|_: &Ping| {}));
/// ```
pub struct Listener<T: Event> {
    callback: Arc<Callback<T>>,
}

impl<T: Event> Listener<T> {
    /// Wraps an infallible callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::fallible(move |event| {
            callback(event);
            Ok(())
        })
    }

    /// Wraps a callback that may report failure.
    ///
    /// A failure never prevents the remaining listeners of the same publish
    /// from running; see [`EventBus::publish`](crate::EventBus::publish).
    pub fn fallible<F>(callback: F) -> Self
    where
        F: Fn(&T) -> ListenerResult + Send + Sync + 'static,
    {
        Self { callback: Arc::new(callback) }
    }

    pub(crate) fn invoke(&self, event: &T) -> ListenerResult {
        (self.callback)(event)
    }
}

impl<T: Event> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self { callback: Arc::clone(&self.callback) }
    }
}

impl<T: Event> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<T: Event> Eq for Listener<T> {}

impl<T: Event> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event", &std::any::type_name::<T>())
            .field("callback", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}
