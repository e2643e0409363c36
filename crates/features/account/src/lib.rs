//! Account feature slice: anonymous device login, profile updates, account
//! linking and per-player data, built on the callback bridge.
//!
//! The remote provider is abstracted by [`AccountProvider`] (account calls)
//! and [`courier_bridge::RemoteStore`] (player data); a concrete SDK adapter
//! implements both.

mod error;
mod identity;
mod provider;
mod service;

pub use error::{AccountError, AccountErrorExt};
pub use identity::LocalIdentity;
pub use provider::AccountProvider;
pub use service::AccountService;
