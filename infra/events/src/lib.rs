//! # Event Bus
//!
//! A small, type-safe, synchronous publish/subscribe bus for decoupled
//! in-process notification.
//!
//! ## Overview
//!
//! An [`EventBus`] maps each payload type to an ordered list of [`Listener`]s.
//! Publishing a value of type `T` runs every listener registered for `T`, in
//! registration order, on the calling thread.
//!
//! ## Features
//!
//! * **Type-Safe**: Topics are identified by the payload's Rust type.
//! * **Deterministic**: Registration order is dispatch order; duplicates are kept.
//! * **Re-entrant**: Listeners run against a snapshot with no lock held.
//! * **Failure Isolation**: One failing listener never silences the others.
//! * **Shared**: One bus instance, cloned into every component that needs it.
//!
//! # Example
//!
//! ```rust
//! use courier_event_bus::{EventBus, EventBusError};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Debug)]
//! struct PlayerJoined { id: u64 }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let joined = Arc::new(AtomicUsize::new(0));
//!
//!     let counter = Arc::clone(&joined);
//!     let listener = bus.subscribe_fn(move |_: &PlayerJoined| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })?;
//!
//!     bus.publish(PlayerJoined { id: 42 })?;
//!     bus.unsubscribe(&listener)?;
//!     bus.publish(PlayerJoined { id: 7 })?;
//!
//!     assert_eq!(joined.load(Ordering::SeqCst), 1);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod listener;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use listener::{Listener, ListenerError, ListenerResult};
