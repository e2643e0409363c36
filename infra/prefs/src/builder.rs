use crate::error::{PrefsError, PrefsErrorExt};
use crate::store::{Entries, FileBackend, Preferences, PrefsInner, TMP_MARKER};
use parking_lot::RwLock;
use private::Sealed;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct PreferencesBuilder<S: Sealed = NoPath> {
    state: S,
    create: bool,
}

impl Default for PreferencesBuilder<NoPath> {
    fn default() -> Self {
        Self { state: NoPath, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> PreferencesBuilder<S> {
    #[must_use = "Sets whether a missing file and its parent directory should be created"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl PreferencesBuilder<NoPath> {
    #[must_use = "Creates a new preferences builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the JSON file backing the preferences"]
    pub fn path(self, path: impl Into<PathBuf>) -> PreferencesBuilder<WithPath> {
        PreferencesBuilder { state: WithPath(path.into()), create: self.create }
    }
}

impl PreferencesBuilder<WithPath> {
    /// Loads the backing file into the cache and returns the handle.
    ///
    /// A missing file is treated as empty preferences when `create(true)` is
    /// set (the default); the file itself is written on the first mutation.
    /// Temp files left behind by an interrupted write are removed.
    ///
    /// # Errors
    ///
    /// * [`PrefsError::Io`] if the parent directory cannot be created, or the
    ///   file is missing and `create` is false, or the file cannot be read.
    /// * [`PrefsError::Corrupt`] if the file is not a JSON object of strings.
    pub async fn connect(self) -> Result<Preferences, PrefsError> {
        let path = self.state.0;

        if self.create
            && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to bootstrap preferences directory: {}", parent.display()))?;
        }

        let entries = load_entries(&path, self.create).await?;
        purge_tmp(&path).await;
        info!(path = %path.display(), entries = entries.len(), "Preferences connected");

        Ok(Preferences::from_inner(PrefsInner {
            cache: RwLock::new(entries),
            file: Some(FileBackend {
                path,
                write_lock: Mutex::new(()),
                tmp_counter: AtomicU64::new(1),
            }),
        }))
    }
}

async fn load_entries(path: &Path, create: bool) -> Result<Entries, PrefsError> {
    match fs::read(path).await {
        Ok(data) => serde_json::from_slice(&data)
            .context(format!("Failed to parse preferences: {}", path.display())),
        Err(err) if create && err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No preferences file yet; starting empty");
            Ok(Entries::default())
        },
        Err(err) => Err(PrefsError::Io {
            source: err,
            context: Some(format!("Failed to read preferences: {}", path.display()).into()),
        }),
    }
}

async fn purge_tmp(path: &Path) {
    let Some(prefix) = path.file_name().and_then(|s| s.to_str()).map(|n| format!("{n}{TMP_MARKER}"))
    else {
        return;
    };
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "Temp cleanup skipped");
            return;
        },
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        if !entry.file_name().to_str().is_some_and(|name| name.starts_with(&prefix)) {
            continue;
        }
        match fs::remove_file(entry.path()).await {
            Ok(()) => debug!(path = %entry.path().display(), "Removed orphaned temp file"),
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Failed to remove orphaned temp file");
            },
        }
    }
}
