use crate::callback::{OnFailure, OnSuccess, call};
use crate::completion::Pending;
use crate::error::{BridgeError, BridgeErrorExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, trace};

/// Who may read a stored blob besides its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Readable and writable by the owning client only.
    #[default]
    Private,
    /// Readable by other players; written by the owning client.
    Public,
}

/// Callback-style remote key-value storage of text blobs.
///
/// `get` reports `None` when the key holds no data. Implementations may
/// invoke the continuations on any thread.
pub trait RemoteStore: Send + Sync {
    fn get(&self, key: &str, on_success: OnSuccess<Option<String>>, on_failure: OnFailure);

    fn put(
        &self,
        key: &str,
        blob: String,
        visibility: Visibility,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    );
}

impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    fn get(&self, key: &str, on_success: OnSuccess<Option<String>>, on_failure: OnFailure) {
        (**self).get(key, on_success, on_failure);
    }

    fn put(
        &self,
        key: &str,
        blob: String,
        visibility: Visibility,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    ) {
        (**self).put(key, blob, visibility, on_success, on_failure);
    }
}

/// Typed JSON persistence on top of a [`RemoteStore`].
///
/// Values are encoded with `serde_json` before `put` and decoded after `get`.
/// A decoding failure is reported as [`BridgeError::Deserialize`], never as a
/// remote failure, and a missing key loads as `Ok(None)`.
#[derive(Debug, Clone)]
pub struct JsonStore<S> {
    store: S,
}

impl<S: RemoteStore> JsonStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Fetches the raw blob stored under `key`.
    pub fn get_raw(&self, key: &str) -> Pending<Option<String>> {
        trace!(key, "Fetching remote blob");
        call(key, |key, on_success, on_failure| self.store.get(key, on_success, on_failure))
    }

    /// Stores a raw blob under `key`.
    pub fn put_raw(&self, key: &str, blob: String, visibility: Visibility) -> Pending<()> {
        trace!(key, bytes = blob.len(), ?visibility, "Storing remote blob");
        call((key, blob), |(key, blob), on_success, on_failure| {
            self.store.put(key, blob, visibility, on_success, on_failure);
        })
    }

    /// Serializes `value` and stores it privately under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Pending<()> {
        self.save_with(key, value, Visibility::Private)
    }

    /// Serializes `value` and stores it under `key` with the given visibility.
    ///
    /// A value that cannot be serialized yields an already-rejected handle
    /// with [`BridgeError::Serialize`]; nothing is sent.
    pub fn save_with<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        visibility: Visibility,
    ) -> Pending<()> {
        match serde_json::to_string(value) {
            Ok(blob) => self.put_raw(key, blob, visibility),
            Err(err) => {
                debug!(key, error = %err, "Refusing to store unserializable value");
                Pending::rejected(BridgeError::Serialize {
                    message: err.to_string().into(),
                    context: Some(format!("key `{key}`").into()),
                })
            }
        }
    }

    /// Fetches and decodes the value stored under `key`.
    ///
    /// # Errors
    /// * [`BridgeError::Remote`] if the provider reports a failure.
    /// * [`BridgeError::Deserialize`] if the stored blob does not decode as `T`.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BridgeError> {
        let raw = self.get_raw(key).await?;
        decode(key, raw.as_deref())
    }
}

/// Decodes a blob fetched from `key`; an absent blob decodes as `None`.
///
/// # Errors
/// Returns [`BridgeError::Deserialize`] if `raw` is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Result<Option<T>, BridgeError> {
    let Some(raw) = raw else {
        trace!(key, "No remote blob stored");
        return Ok(None);
    };

    serde_json::from_str(raw).context(format!("key `{key}`")).map(Some)
}
