//! Durable local preferences.
//!
//! A small string key/value slot for values that must survive restarts,
//! such as the device's anonymous login id. Two backends:
//!
//! - **In-memory**: [`Preferences::in_memory`], for tests and ephemeral clients.
//! - **File**: [`Preferences::builder`], one JSON object per file, rewritten
//!   atomically (unique temp write + `fsync` + `rename`) on every mutation.
//!
//! Reads are synchronous and served from the cache; writes are async and
//! serialized so concurrent `set`s never interleave their renames.

mod builder;
mod error;
mod store;

pub use builder::PreferencesBuilder;
pub use error::{PrefsError, PrefsErrorExt};
pub use store::Preferences;
