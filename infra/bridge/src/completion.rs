//! One-shot completion primitive.
//!
//! A [`pending`] call yields a [`Completer`] (the write side, cloneable, usable
//! from any thread) and a [`Pending`] handle (the read side, a `Future`).
//! Exactly one settlement ever takes effect: the state moves from
//! `Pending` to `Resolved` or `Rejected` through a single compare-and-swap, and
//! every later attempt is discarded.

use crate::error::BridgeError;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::trace;

const PENDING: u8 = 0;
const RESOLVED: u8 = 1;
const REJECTED: u8 = 2;

/// Observable lifecycle of a bridged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Resolved,
    Rejected,
}

type Outcome<T> = Result<T, BridgeError>;

struct Shared<T> {
    state: AtomicU8,
    sender: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
}

impl<T> Shared<T> {
    fn state(&self) -> OperationState {
        match self.state.load(Ordering::Acquire) {
            PENDING => OperationState::Pending,
            RESOLVED => OperationState::Resolved,
            _ => OperationState::Rejected,
        }
    }

    fn settle(&self, outcome: Outcome<T>) -> bool {
        let target = if outcome.is_ok() { RESOLVED } else { REJECTED };
        if self.state.compare_exchange(PENDING, target, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            trace!(
                attempted = if outcome.is_ok() { "resolve" } else { "reject" },
                "Settlement discarded: operation already settled"
            );
            return false;
        }

        if let Some(sender) = self.sender.lock().take() {
            // The handle may already be gone; the outcome is dropped with it.
            let _ = sender.send(outcome);
        }
        true
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared").field("state", &self.state()).finish_non_exhaustive()
    }
}

/// Rejects the operation with [`BridgeError::Abandoned`] when the last
/// completer goes away unsettled.
struct AbandonGuard<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Drop for AbandonGuard<T> {
    fn drop(&mut self) {
        if self.shared.state() == OperationState::Pending {
            trace!("Last completer dropped while pending");
            self.shared.settle(Err(BridgeError::Abandoned {
                message: "completer dropped without settling".into(),
                context: None,
            }));
        }
    }
}

/// Write side of a one-shot operation.
///
/// Clones share the same operation, so one clone can go into a success
/// callback and another into a failure callback. Settlement is thread-safe.
pub struct Completer<T> {
    guard: Arc<AbandonGuard<T>>,
}

impl<T> Completer<T> {
    /// Resolves the operation with `value`.
    ///
    /// Returns `false` (and drops `value`) if the operation already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the operation with `error`.
    ///
    /// Returns `false` if the operation already settled.
    pub fn reject(&self, error: BridgeError) -> bool {
        self.settle(Err(error))
    }

    /// Settles the operation with a ready-made outcome.
    ///
    /// Returns `false` if the operation already settled.
    pub fn settle(&self, outcome: Result<T, BridgeError>) -> bool {
        self.guard.shared.settle(outcome)
    }

    #[must_use]
    pub fn state(&self) -> OperationState {
        self.guard.shared.state()
    }
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self { guard: Arc::clone(&self.guard) }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer").field("state", &self.state()).finish()
    }
}

/// Read side of a one-shot operation.
///
/// Awaiting it yields the settled outcome. It can also be inspected with
/// [`Pending::state`], cancelled with [`Pending::cancel`] or bounded with
/// [`Pending::timeout`].
#[must_use = "a pending operation does nothing observable unless awaited"]
pub struct Pending<T> {
    shared: Arc<Shared<T>>,
    receiver: oneshot::Receiver<Outcome<T>>,
}

/// Creates a linked [`Completer`] / [`Pending`] pair.
///
/// # Examples
/// ```rust
/// use courier_bridge::completion::{OperationState, pending};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (completer, handle) = pending::<u32>();
/// assert!(completer.resolve(7));
/// assert!(!completer.resolve(8));
/// assert_eq!(handle.state(), OperationState::Resolved);
/// assert_eq!(handle.await.unwrap(), 7);
/// # }
/// ```
pub fn pending<T>() -> (Completer<T>, Pending<T>) {
    let (sender, receiver) = oneshot::channel();
    let shared = Arc::new(Shared { state: AtomicU8::new(PENDING), sender: Mutex::new(Some(sender)) });

    let completer = Completer { guard: Arc::new(AbandonGuard { shared: Arc::clone(&shared) }) };
    (completer, Pending { shared, receiver })
}

impl<T> Pending<T> {
    /// A handle that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let (completer, pending) = pending();
        completer.resolve(value);
        pending
    }

    /// A handle that is already rejected with `error`.
    pub fn rejected(error: BridgeError) -> Self {
        let (completer, pending) = pending();
        completer.reject(error);
        pending
    }

    #[must_use]
    pub fn state(&self) -> OperationState {
        self.shared.state()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state() != OperationState::Pending
    }

    /// Rejects the operation with [`BridgeError::Cancelled`] if it is still pending.
    ///
    /// Returns `false` when the operation had already settled; its outcome is
    /// left untouched.
    pub fn cancel(&self) -> bool {
        self.shared.settle(Err(BridgeError::Cancelled {
            message: "cancelled by caller".into(),
            context: None,
        }))
    }

    /// Waits for the outcome for at most `duration`.
    ///
    /// If the deadline passes first, the operation is rejected with
    /// [`BridgeError::TimedOut`], so a late provider callback becomes a no-op.
    /// An outcome that won the race right at the deadline is still returned.
    ///
    /// # Errors
    /// Returns the settled error, or [`BridgeError::TimedOut`].
    pub async fn timeout(mut self, duration: Duration) -> Result<T, BridgeError> {
        if let Ok(outcome) = tokio::time::timeout(duration, &mut self).await {
            return outcome;
        }

        self.shared.settle(Err(BridgeError::TimedOut {
            message: format!("no settlement within {duration:?}").into(),
            context: None,
        }));
        self.await
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(BridgeError::Abandoned {
                    message: "completion channel closed".into(),
                    context: None,
                })
            })
        })
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").field("state", &self.state()).finish()
    }
}
