use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Preferences key under which the anonymous login id is persisted.
pub const DEFAULT_CUSTOM_ID_KEY: &str = "PF_CustomId_v1";

/// Top-level client configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfigInner {
    pub provider: ProviderConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten, default)]
    inner: Arc<ClientConfigInner>,
}

impl Deref for ClientConfig {
    type Target = ClientConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ClientConfig {
    fn deref_mut(&mut self) -> &mut ClientConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Remote account provider settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Title the client logs into. Empty means "configure at runtime".
    pub title_id: String,
    /// Upper bound for a single remote call; unbounded when absent.
    pub request_timeout_secs: Option<u64>,
}

impl ProviderConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Anonymous identity settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub custom_id_key: String,
    /// JSON file backing local preferences; in-memory when absent.
    pub preferences_path: Option<PathBuf>,
}

/// Log file rotation cadence.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Logging settings mapped onto the logger builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    pub rotation: LogRotation,
}

// --- Default ---

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { custom_id_key: DEFAULT_CUSTOM_ID_KEY.to_owned(), preferences_path: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "courier".to_owned(),
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 10,
            rotation: LogRotation::Daily,
        }
    }
}
