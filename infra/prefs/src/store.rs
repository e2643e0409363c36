use crate::builder::PreferencesBuilder;
use crate::error::{PrefsError, PrefsErrorExt};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

pub(crate) const TMP_MARKER: &str = ".courier-tmp.";

pub(crate) type Entries = FxHashMap<String, String>;

/// Durable local key/value slot.
///
/// Reads are served from an in-memory cache and never touch the disk. With a
/// file backend, every mutation rewrites the whole JSON object atomically
/// (unique temp file, `fsync`, rename) before the cache is updated, so the
/// cache never shows a value that is not durable.
///
/// Cloning is cheap; clones share the same cache and file.
///
/// # Examples
/// ```rust
/// use courier_prefs::{Preferences, PrefsError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), PrefsError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let prefs = Preferences::builder().path(tmp.path().join("prefs.json")).connect().await?;
///
/// prefs.set("PF_CustomId_v1", "abc").await?;
/// assert_eq!(prefs.get("PF_CustomId_v1").as_deref(), Some("abc"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Preferences {
    inner: Arc<PrefsInner>,
}

pub(crate) struct PrefsInner {
    pub(crate) cache: RwLock<Entries>,
    pub(crate) file: Option<FileBackend>,
}

pub(crate) struct FileBackend {
    pub(crate) path: PathBuf,
    pub(crate) write_lock: Mutex<()>,
    pub(crate) tmp_counter: AtomicU64,
}

impl Preferences {
    /// Preferences that live only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_inner(PrefsInner { cache: RwLock::new(Entries::default()), file: None })
    }

    #[must_use = "Creates a builder for file-backed preferences"]
    pub fn builder() -> PreferencesBuilder {
        PreferencesBuilder::new()
    }

    pub(crate) fn from_inner(inner: PrefsInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.cache.read().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.cache.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cache.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location of the backing file, `None` for in-memory preferences.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.file.as_ref().map(|file| file.path.as_path())
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    /// Returns [`PrefsError::Io`] if the file backend cannot be written; the
    /// previous value stays visible in that case.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), PrefsError> {
        let (key, value) = (key.into(), value.into());
        trace!(key = %key, "Setting preference");
        self.mutate(|entries| {
            entries.insert(key, value);
            true
        })
        .await
        .map(|_| ())
    }

    /// Removes `key`. Returns `true` if it was present.
    ///
    /// # Errors
    /// Returns [`PrefsError::Io`] if the file backend cannot be written.
    pub async fn remove(&self, key: &str) -> Result<bool, PrefsError> {
        trace!(key, "Removing preference");
        self.mutate(|entries| entries.remove(key).is_some()).await
    }

    /// Applies `change` to a copy of the entries, persists the copy when
    /// `change` reports a modification, then publishes it to the cache.
    async fn mutate<F>(&self, change: F) -> Result<bool, PrefsError>
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let Some(file) = &self.inner.file else {
            return Ok(change(&mut self.inner.cache.write()));
        };

        let _guard = file.write_lock.lock().await;
        let mut next = self.inner.cache.read().clone();
        if !change(&mut next) {
            return Ok(false);
        }

        file.persist(&next).await?;
        *self.inner.cache.write() = next;
        Ok(true)
    }
}

impl FileBackend {
    async fn persist(&self, entries: &Entries) -> Result<(), PrefsError> {
        let ordered: BTreeMap<&str, &str> =
            entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let data = serde_json::to_vec_pretty(&ordered).map_err(|err| PrefsError::Internal {
            message: err.to_string().into(),
            context: Some("Failed to encode preferences".into()),
        })?;

        let temp = self.unique_tmp_path();
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove orphaned temp file");
            }
            return Err(PrefsError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), self.path.display())
                        .into(),
                ),
            });
        }

        debug!(path = %self.path.display(), entries = entries.len(), "Preferences saved atomically");
        Ok(())
    }

    fn unique_tmp_path(&self) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = self.path.file_name().and_then(|s| s.to_str()).unwrap_or("preferences");
        self.path.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("path", &self.path())
            .field("entries", &self.len())
            .finish()
    }
}
