//! # Callback Bridge
//!
//! Turns callback-style remote calls (one success continuation, one failure
//! continuation) into awaitable results that settle exactly once.
//!
//! ## Overview
//!
//! * [`completion`]: the [`Completer`] / [`Pending`] pair. First settlement
//!   wins; later ones are discarded.
//! * [`callback`]: [`call`] wires a provider's two continuations to a
//!   [`Pending`], and [`ErrorInfo`] maps provider failures into
//!   [`BridgeError::Remote`].
//! * [`chain`]: sequencing with a best-effort follow-up.
//! * [`store`]: typed JSON save/load over a [`RemoteStore`].
//!
//! # Example
//!
//! ```rust
//! use courier_bridge::{ErrorInfo, call};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let login = call("player-1", |id: &str, on_success, _on_failure| {
//!     let ticket = format!("ticket-for-{id}");
//!     std::thread::spawn(move || on_success(ticket));
//! });
//!
//! assert_eq!(login.await.unwrap(), "ticket-for-player-1");
//! # }
//! ```

pub mod callback;
pub mod chain;
pub mod completion;
mod error;
pub mod store;

pub use callback::{ErrorInfo, OnFailure, OnSuccess, call};
pub use chain::chain_best_effort;
pub use completion::{Completer, OperationState, Pending, pending};
pub use error::{BridgeError, BridgeErrorExt};
pub use store::{JsonStore, RemoteStore, Visibility};
