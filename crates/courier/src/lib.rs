//! Facade crate for courier clients.
//! Re-exports the shared crates and wires one [`Courier`] composition root:
//! a single [`EventBus`], the local [`Preferences`] slot and the
//! [`AccountService`], all built from one [`ClientConfig`].
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! ```rust,ignore
//! let config = courier::load_config(Some("courier.toml"))?;
//! let _logger = courier::init_logging(&config)?;
//! let client = courier::Courier::init(config, Arc::new(MyProviderAdapter::new())).await?;
//! client.accounts().login_anonymous(true, Some("Nova")).await?;
//! ```

mod error;

pub use courier_account as account;
pub use courier_bridge as bridge;
pub use courier_domain as domain;
pub use courier_event_bus as events;
pub use courier_kernel as kernel;
pub use courier_logger as logger;
pub use courier_prefs as prefs;
pub use error::{CourierError, CourierErrorExt};

use courier_account::{AccountProvider, AccountService};
use courier_bridge::RemoteStore;
use courier_domain::config::ClientConfig;
use courier_event_bus::EventBus;
use courier_logger::Logger;
use courier_prefs::Preferences;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loads [`ClientConfig`] from a file layered under `COURIER__*` environment variables.
///
/// # Errors
/// Returns [`CourierError::Config`] if an explicit file is missing or malformed.
pub fn load_config(path: Option<impl AsRef<Path>>) -> Result<ClientConfig, CourierError> {
    Ok(courier_kernel::config::load_config(path)?)
}

/// Installs the global tracing subscriber described by `config.logging`.
///
/// # Errors
/// Returns [`CourierError::Logger`] if the subscriber cannot be installed.
pub fn init_logging(config: &ClientConfig) -> Result<Logger, CourierError> {
    Logger::from_config(&config.logging).context("logging")
}

/// Composition root of a client.
///
/// Owns the one [`EventBus`] every component publishes to, so a host
/// subscribes through [`Courier::events`] and sees all notifications.
pub struct Courier<P> {
    config: ClientConfig,
    events: EventBus,
    preferences: Preferences,
    accounts: AccountService<P>,
}

impl<P> Courier<P>
where
    P: AccountProvider + RemoteStore + 'static,
{
    /// Builds the client around a provider adapter.
    ///
    /// Preferences are file-backed when `identity.preferences_path` is set,
    /// otherwise in-memory.
    ///
    /// # Errors
    /// Returns [`CourierError::Preferences`] if the preferences file cannot be opened.
    pub async fn init(config: ClientConfig, provider: Arc<P>) -> Result<Self, CourierError> {
        let preferences = match &config.identity.preferences_path {
            Some(path) => Preferences::builder().path(path).connect().await?,
            None => Preferences::in_memory(),
        };
        let events = EventBus::new();
        let accounts = AccountService::new(provider, preferences.clone(), events.clone(), &config);

        info!(
            title_id = %config.provider.title_id,
            persistent = preferences.path().is_some(),
            "Courier client initialized"
        );
        Ok(Self { config, events, preferences, accounts })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub const fn accounts(&self) -> &AccountService<P> {
        &self.accounts
    }
}

impl<P> fmt::Debug for Courier<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Courier")
            .field("config", &self.config)
            .field("events", &self.events)
            .field("preferences", &self.preferences)
            .field("accounts", &self.accounts)
            .finish()
    }
}
