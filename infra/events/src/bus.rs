use crate::error::EventBusError;
use crate::listener::Listener;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Marker trait for types that can be published on the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

/// Type-erased, ordered listener collection of a single topic.
trait ListenerSet: Any + Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Event> ListenerSet for Vec<Listener<T>> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Topic {
    name: &'static str,
    listeners: Box<dyn ListenerSet>,
}

impl Topic {
    fn new<T: Event>() -> Self {
        Self { name: type_name::<T>(), listeners: Box::new(Vec::<Listener<T>>::new()) }
    }

    fn listeners<T: Event>(&self) -> Result<&Vec<Listener<T>>, EventBusError> {
        let name = self.name;
        self.listeners.as_any().downcast_ref::<Vec<Listener<T>>>().ok_or_else(|| mismatch::<T>(name))
    }

    fn listeners_mut<T: Event>(&mut self) -> Result<&mut Vec<Listener<T>>, EventBusError> {
        let name = self.name;
        self.listeners
            .as_any_mut()
            .downcast_mut::<Vec<Listener<T>>>()
            .ok_or_else(|| mismatch::<T>(name))
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn mismatch<T: Event>(registered: &'static str) -> EventBusError {
    EventBusError::TypeMismatch {
        message: type_name::<T>().into(),
        context: Some(format!("Topic registered for {registered}").into()),
    }
}

/// A thread-safe, synchronous, type-indexed publish/subscribe bus.
///
/// Topics are keyed by the [`TypeId`] of the payload, so callers never name a
/// topic explicitly: it is implied by the type at each call site. Each topic
/// holds an ordered list of [`Listener`]s.
///
/// # Semantics
///
/// * **Ordering**: listeners run in registration order. Subscribing the same
///   listener twice registers it twice.
/// * **Snapshot fan-out**: [`EventBus::publish`] copies the listener list before
///   invoking anything. Listeners added or removed from inside a listener take
///   effect from the next publish on.
/// * **Failure isolation**: a failing listener never stops the fan-out; the
///   failure is logged and reported once all listeners ran.
/// * **No empty topics**: a topic entry disappears together with its last
///   listener.
///
/// # Concurrency
///
/// The registry sits behind a single `parking_lot::RwLock`. Mutations take the
/// write lock, and removing an emptied topic happens under the same guard as
/// removing its last listener, so a concurrent `subscribe` is never lost.
/// Listeners are invoked with no lock held; they may freely call back into the
/// bus.
///
/// The handle is internally reference-counted and cheap to clone: clones share
/// one registry.
///
/// # Example
/// ```rust
/// use courier_event_bus::{EventBus, EventBusError, Listener};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct ScoreChanged(u64);
///
/// # fn main() -> Result<(), EventBusError> {
/// let bus = EventBus::new();
/// let last = Arc::new(AtomicU64::new(0));
///
/// let sink = Arc::clone(&last);
/// let listener = Listener::new(move |e: &ScoreChanged| sink.store(e.0, Ordering::SeqCst));
/// bus.subscribe(listener.clone())?;
///
/// assert_eq!(bus.publish(ScoreChanged(42))?, 1);
/// assert_eq!(last.load(Ordering::SeqCst), 42);
///
/// bus.unsubscribe(&listener)?;
/// assert!(!bus.topic_exists::<ScoreChanged>());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    topics: Arc<RwLock<FxHashMap<TypeId, Topic>>>,
}

impl EventBus {
    /// Creates a new, empty `EventBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the topic of `T`, creating the topic if needed.
    ///
    /// Registering a listener that is already present adds a second entry.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] only if the registry entry for `T`
    /// holds listeners of another type, which indicates registry corruption.
    pub fn subscribe<T: Event>(&self, listener: Listener<T>) -> Result<(), EventBusError> {
        let mut topics = self.topics.write();
        let topic = topics.entry(TypeId::of::<T>()).or_insert_with(|| {
            trace!(event = type_name::<T>(), "Registering new topic");
            Topic::new::<T>()
        });

        let listeners = topic.listeners_mut::<T>()?;
        listeners.push(listener);
        debug!(event = type_name::<T>(), listeners = listeners.len(), "Listener subscribed");
        Ok(())
    }

    /// Wraps `callback` into a [`Listener`], subscribes it, and returns the
    /// handle so it can be unsubscribed later.
    ///
    /// # Errors
    /// See [`EventBus::subscribe`].
    pub fn subscribe_fn<T, F>(&self, callback: F) -> Result<Listener<T>, EventBusError>
    where
        T: Event,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener = Listener::new(callback);
        self.subscribe(listener.clone())?;
        Ok(listener)
    }

    /// Removes one entry equal to `listener` from the topic of `T`.
    ///
    /// When the listener was registered several times, the most recent
    /// registration is removed and the earlier ones keep their positions.
    /// Returns `false` when no equal entry exists. Removing the last listener
    /// deletes the topic entry.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] on registry corruption.
    pub fn unsubscribe<T: Event>(&self, listener: &Listener<T>) -> Result<bool, EventBusError> {
        let id = TypeId::of::<T>();
        let mut topics = self.topics.write();
        let Some(topic) = topics.get_mut(&id) else {
            return Ok(false);
        };

        let listeners = topic.listeners_mut::<T>()?;
        let Some(index) = listeners.iter().rposition(|registered| registered == listener) else {
            return Ok(false);
        };
        listeners.remove(index);
        let remaining = listeners.len();

        if remaining == 0 {
            topics.remove(&id);
            debug!(event = type_name::<T>(), "Last listener removed; topic dropped");
        } else {
            debug!(event = type_name::<T>(), remaining, "Listener unsubscribed");
        }
        Ok(true)
    }

    /// Publishes `event` to every listener of `T`.
    ///
    /// # Errors
    /// See [`EventBus::publish_ref`].
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_ref(&event)
    }

    /// Publishes a borrowed event to every listener of `T`.
    ///
    /// Listeners are invoked synchronously on the calling thread, in
    /// registration order, against a snapshot taken when the call starts.
    /// Publishing to a topic without listeners is a no-op returning `Ok(0)`.
    ///
    /// Returns the number of listeners invoked.
    ///
    /// # Errors
    /// Returns [`EventBusError::ListenerFailed`] when at least one listener
    /// reported a failure. Every listener in the snapshot has run by then.
    pub fn publish_ref<T: Event>(&self, event: &T) -> Result<usize, EventBusError> {
        let snapshot = self.snapshot::<T>()?;
        if snapshot.is_empty() {
            trace!(event = type_name::<T>(), "Event dropped: no listeners");
            return Ok(0);
        }

        let mut failed = 0usize;
        for (position, listener) in snapshot.iter().enumerate() {
            if let Err(error) = listener.invoke(event) {
                failed += 1;
                warn!(
                    event = type_name::<T>(),
                    position,
                    error = %error,
                    "Listener failed; continuing fan-out"
                );
            }
        }

        let invoked = snapshot.len();
        if failed > 0 {
            return Err(EventBusError::ListenerFailed {
                message: format!("{failed} of {invoked} listeners failed").into(),
                context: Some(type_name::<T>().into()),
            });
        }

        trace!(event = type_name::<T>(), invoked, "Event dispatched");
        Ok(invoked)
    }

    /// Removes the topic of `T` with all its listeners.
    ///
    /// Returns the number of listeners removed.
    pub fn clear<T: Event>(&self) -> usize {
        let removed = self.topics.write().remove(&TypeId::of::<T>());
        removed.map_or(0, |topic| {
            let count = topic.listeners.len();
            debug!(event = type_name::<T>(), count, "Topic cleared");
            count
        })
    }

    /// Removes every topic.
    ///
    /// Returns the number of topics removed.
    pub fn clear_all(&self) -> usize {
        let count = {
            let mut topics = self.topics.write();
            let count = topics.len();
            topics.clear();
            count
        };
        debug!(count, "All topics cleared");
        count
    }

    /// Returns `true` if at least one listener is registered for `T`.
    #[must_use]
    pub fn topic_exists<T: Event>(&self) -> bool {
        self.topics.read().contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered entries for `T`, duplicates included.
    #[must_use]
    pub fn listener_count<T: Event>(&self) -> usize {
        self.topics.read().get(&TypeId::of::<T>()).map_or(0, |topic| topic.listeners.len())
    }

    /// Returns the number of topics with at least one listener.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    fn snapshot<T: Event>(&self) -> Result<Vec<Listener<T>>, EventBusError> {
        let topics = self.topics.read();
        topics
            .get(&TypeId::of::<T>())
            .map_or_else(|| Ok(Vec::new()), |topic| topic.listeners::<T>().cloned())
    }
}
