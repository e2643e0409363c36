use crate::error::{AccountError, AccountErrorExt};
use crate::identity::LocalIdentity;
use crate::provider::AccountProvider;
use courier_bridge::store::decode;
use courier_bridge::{BridgeError, JsonStore, Pending, RemoteStore, Visibility, call, chain_best_effort};
use courier_domain::account::{
    InfoRequest, LinkAppleRequest, LinkGoogleRequest, LinkKind, LoginRequest, LoginResult,
    UsernamePasswordRequest,
};
use courier_domain::config::ClientConfig;
use courier_domain::events::{AccountLinked, ContactEmailUpdated, DisplayNameChanged, LoggedIn};
use courier_event_bus::{Event, EventBus};
use courier_prefs::Preferences;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Account operations of a game client against a callback-style provider.
///
/// Every remote call goes through the completion bridge, so each operation
/// settles exactly once and honours the configured request timeout.
/// Successful changes are announced on the shared [`EventBus`]; listener
/// failures are logged and never turn a successful operation into an error.
///
/// Cloning is cheap; clones share state.
pub struct AccountService<P> {
    inner: Arc<AccountInner<P>>,
}

struct AccountInner<P> {
    provider: Arc<P>,
    store: JsonStore<Arc<P>>,
    identity: LocalIdentity,
    bus: EventBus,
    title_id: RwLock<String>,
    timeout: Option<Duration>,
    session: RwLock<Option<LoginResult>>,
}

impl<P> Clone for AccountService<P> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<P> fmt::Debug for AccountService<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("title_id", &*self.inner.title_id.read())
            .field("identity_key", &self.inner.identity.key())
            .field("logged_in", &self.inner.session.read().is_some())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl<P> AccountInner<P> {
    async fn settle<T>(&self, pending: Pending<T>) -> Result<T, BridgeError> {
        match self.timeout {
            Some(limit) => pending.timeout(limit).await,
            None => pending.await,
        }
    }

    fn publish<E: Event>(&self, event: E) {
        if let Err(err) = self.bus.publish(event) {
            warn!(event = type_name::<E>(), error = %err, "Listeners failed after a successful account operation");
        }
    }
}

impl<P> AccountService<P>
where
    P: AccountProvider + RemoteStore + 'static,
{
    pub fn new(provider: Arc<P>, prefs: Preferences, bus: EventBus, config: &ClientConfig) -> Self {
        let identity = LocalIdentity::new(prefs, config.identity.custom_id_key.as_str());
        Self {
            inner: Arc::new(AccountInner {
                store: JsonStore::new(Arc::clone(&provider)),
                provider,
                identity,
                bus,
                title_id: RwLock::new(config.provider.title_id.clone()),
                timeout: config.provider.request_timeout(),
                session: RwLock::new(None),
            }),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &LocalIdentity {
        &self.inner.identity
    }

    #[must_use]
    pub fn title_id(&self) -> String {
        self.inner.title_id.read().clone()
    }

    /// The last successful login, with any display name set since.
    #[must_use]
    pub fn session(&self) -> Option<LoginResult> {
        self.inner.session.read().clone()
    }

    /// Sets the provider title id unless one is already configured.
    ///
    /// Returns the title id in effect afterwards.
    pub fn configure(&self, title_id: &str) -> String {
        let mut current = self.inner.title_id.write();
        if current.is_empty() {
            title_id.clone_into(&mut current);
            info!(title_id, "Provider title configured");
        } else {
            debug!(current = %current.as_str(), ignored = title_id, "Provider title already configured");
        }
        current.clone()
    }

    /// Logs in with the device-local anonymous id, creating it on first use.
    ///
    /// When `create_account` is set and a non-blank `display_name` is given,
    /// the display name is applied after login on a best-effort basis: its
    /// failure is logged and the login still succeeds. Publishes [`LoggedIn`].
    ///
    /// # Errors
    /// * [`AccountError::Config`] if no title id is configured.
    /// * [`AccountError::Preferences`] if the local id cannot be persisted.
    /// * [`AccountError::Bridge`] if the login itself fails.
    pub async fn login_anonymous(
        &self,
        create_account: bool,
        display_name: Option<&str>,
    ) -> Result<LoginResult, AccountError> {
        let title_id = self.title_id();
        if title_id.is_empty() {
            return Err(AccountError::Config {
                message: "provider title id is not configured".into(),
                context: Some("login_anonymous".into()),
            });
        }

        let custom_id =
            self.inner.identity.ensure().await.context("Failed to ensure local identity")?;
        let request = LoginRequest { title_id, custom_id, create_account, info: InfoRequest::ALL };

        let inner = &self.inner;
        let login = async {
            let pending = call(request, |request, on_success, on_failure| {
                inner.provider.login_with_custom_id(request, on_success, on_failure);
            });
            let result = inner.settle(pending).await?;
            *inner.session.write() = Some(result.clone());
            Ok::<_, BridgeError>(result)
        };

        let rename = display_name
            .map(str::trim)
            .filter(|name| create_account && !name.is_empty())
            .map(|name| {
                let inner = Arc::clone(&self.inner);
                let name = name.to_owned();
                move |_: &LoginResult| Self::rename(inner, name)
            });

        let result = chain_best_effort(login, rename).await.context("Login with custom id failed")?;
        let result = self.session().unwrap_or(result);

        info!(player_id = %result.player_id, newly_created = result.newly_created, "Logged in");
        self.inner.publish(LoggedIn {
            player_id: result.player_id.clone(),
            newly_created: result.newly_created,
        });
        Ok(result)
    }

    /// Updates the player's display name. Publishes [`DisplayNameChanged`].
    ///
    /// # Errors
    /// * [`AccountError::InvalidInput`] for a blank name.
    /// * [`AccountError::Bridge`] if the provider rejects the name.
    pub async fn set_display_name(&self, display_name: &str) -> Result<String, AccountError> {
        let name = non_blank(display_name, "display name")?;
        Self::rename(Arc::clone(&self.inner), name).await.context("Failed to update display name")
    }

    /// Adds or replaces the contact email. Publishes [`ContactEmailUpdated`].
    ///
    /// # Errors
    /// * [`AccountError::InvalidInput`] for a blank email.
    /// * [`AccountError::Bridge`] if the provider rejects the request.
    pub async fn update_contact_email(&self, email: &str) -> Result<(), AccountError> {
        let email = non_blank(email, "email")?;
        let pending = call(email.clone(), |email, on_success, on_failure| {
            self.inner.provider.add_or_update_contact_email(email, on_success, on_failure);
        });
        self.inner.settle(pending).await.context("Failed to update contact email")?;

        self.inner.publish(ContactEmailUpdated { email });
        Ok(())
    }

    /// Links a Google account using a server auth code.
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] if the provider rejects the link.
    pub async fn link_google(
        &self,
        server_auth_code: &str,
        force_link: bool,
    ) -> Result<(), AccountError> {
        let request = LinkGoogleRequest { server_auth_code: server_auth_code.to_owned(), force_link };
        let pending = call(request, |request, on_success, on_failure| {
            self.inner.provider.link_google(request, on_success, on_failure);
        });
        self.inner.settle(pending).await.context("Failed to link Google account")?;

        self.linked(LinkKind::Google);
        Ok(())
    }

    /// Links an Apple account using an identity token.
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] if the provider rejects the link.
    pub async fn link_apple(&self, identity_token: &str, force_link: bool) -> Result<(), AccountError> {
        let request = LinkAppleRequest { identity_token: identity_token.to_owned(), force_link };
        let pending = call(request, |request, on_success, on_failure| {
            self.inner.provider.link_apple(request, on_success, on_failure);
        });
        self.inner.settle(pending).await.context("Failed to link Apple account")?;

        self.linked(LinkKind::Apple);
        Ok(())
    }

    /// Adds email/password credentials, using the email as username.
    ///
    /// Returns the registered username.
    ///
    /// # Errors
    /// * [`AccountError::InvalidInput`] for a blank email or empty password.
    /// * [`AccountError::Bridge`] if the provider rejects the credentials.
    pub async fn link_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, AccountError> {
        let email = non_blank(email, "email")?;
        if password.is_empty() {
            return Err(AccountError::InvalidInput {
                message: "password must not be empty".into(),
                context: None,
            });
        }

        let request = UsernamePasswordRequest::new(email, password);
        let pending = call(request, |request, on_success, on_failure| {
            self.inner.provider.add_username_password(request, on_success, on_failure);
        });
        let username =
            self.inner.settle(pending).await.context("Failed to add email credentials")?;

        self.linked(LinkKind::EmailPassword);
        Ok(username)
    }

    /// Stores a string value in the player's data.
    ///
    /// `read_only` data is stored with [`Visibility::Public`].
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] if the provider rejects the write.
    pub async fn set_user_data(
        &self,
        key: &str,
        value: &str,
        read_only: bool,
    ) -> Result<(), AccountError> {
        let pending = self.inner.store.put_raw(key, value.to_owned(), visibility(read_only));
        self.inner.settle(pending).await.context(format!("Failed to store user data `{key}`"))
    }

    /// Reads a string value from the player's data; `None` when absent.
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] if the provider read fails.
    pub async fn get_user_data(&self, key: &str) -> Result<Option<String>, AccountError> {
        let pending = self.inner.store.get_raw(key);
        self.inner.settle(pending).await.context(format!("Failed to read user data `{key}`"))
    }

    /// Serializes `value` as JSON and stores it under `key`.
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] wrapping a serialize or remote failure.
    pub async fn save_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        read_only: bool,
    ) -> Result<(), AccountError> {
        let pending = self.inner.store.save_with(key, value, visibility(read_only));
        self.inner.settle(pending).await.context(format!("Failed to save `{key}`"))
    }

    /// Loads and decodes the JSON stored under `key`; `None` when absent.
    ///
    /// # Errors
    /// Returns [`AccountError::Bridge`] wrapping a remote or decode failure.
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AccountError> {
        let raw = self
            .inner
            .settle(self.inner.store.get_raw(key))
            .await
            .context(format!("Failed to load `{key}`"))?;
        decode(key, raw.as_deref()).context(format!("Failed to load `{key}`"))
    }

    async fn rename(inner: Arc<AccountInner<P>>, name: String) -> Result<String, BridgeError> {
        let pending = call(name, |name, on_success, on_failure| {
            inner.provider.update_display_name(name, on_success, on_failure);
        });
        let stored = inner.settle(pending).await?;

        if let Some(session) = inner.session.write().as_mut() {
            session.display_name = Some(stored.clone());
        }
        inner.publish(DisplayNameChanged { display_name: stored.clone() });
        Ok(stored)
    }

    fn linked(&self, kind: LinkKind) {
        info!(?kind, "Account linked");
        self.inner.publish(AccountLinked { kind });
    }
}

const fn visibility(read_only: bool) -> Visibility {
    if read_only { Visibility::Public } else { Visibility::Private }
}

fn non_blank(value: &str, what: &str) -> Result<String, AccountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::InvalidInput {
            message: format!("{what} must not be empty").into(),
            context: None,
        });
    }
    Ok(trimmed.to_owned())
}
