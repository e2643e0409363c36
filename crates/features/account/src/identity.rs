use courier_kernel::{CUSTOM_ID_LEN, safe_nanoid};
use courier_prefs::{Preferences, PrefsError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Stable device-local id used for anonymous login.
///
/// The id is generated once, persisted in [`Preferences`] under `key`, and
/// reused by every later session on the same device.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    prefs: Preferences,
    key: Arc<str>,
    gate: Arc<Mutex<()>>,
}

impl LocalIdentity {
    pub fn new(prefs: Preferences, key: impl Into<Arc<str>>) -> Self {
        Self { prefs, key: key.into(), gate: Arc::new(Mutex::new(())) }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored id, if one exists and is non-empty.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.prefs.get(&self.key).filter(|id| !id.is_empty())
    }

    /// Returns the stored id, generating and persisting one on first use.
    ///
    /// Concurrent callers on the same identity observe the same id.
    ///
    /// # Errors
    /// Returns [`PrefsError`] if a freshly generated id cannot be persisted.
    pub async fn ensure(&self) -> Result<String, PrefsError> {
        if let Some(id) = self.current() {
            return Ok(id);
        }

        let _gate = self.gate.lock().await;
        if let Some(id) = self.current() {
            return Ok(id);
        }

        let id = safe_nanoid!(CUSTOM_ID_LEN);
        self.prefs.set(&*self.key, id.as_str()).await?;
        info!(key = %self.key, "Generated new local identity");
        Ok(id)
    }

    /// Forgets the stored id so the next [`Self::ensure`] creates a new one.
    ///
    /// # Errors
    /// Returns [`PrefsError`] if the removal cannot be persisted.
    pub async fn reset(&self) -> Result<bool, PrefsError> {
        let _gate = self.gate.lock().await;
        let removed = self.prefs.remove(&self.key).await?;
        debug!(key = %self.key, removed, "Local identity reset");
        Ok(removed)
    }
}
