//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for a courier client:
//! a compact console layer, an optional non-blocking rolling file layer
//! (plain or JSON), and an `EnvFilter` that honours `RUST_LOG`.
//!
//! Configure it either with the typed [`LoggerBuilder`] or straight from the
//! client's [`LoggingConfig`] via [`Logger::from_config`].
//!
//! ## Example
//!
//! ```rust
//! # use courier_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-game")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod settings;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use courier_domain::config::LoggingConfig;
use private::Sealed;
use settings::LoggerSettings;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
///
/// A name is required before [`LoggerBuilder::init`] is available; file-only
/// knobs (`max_files`, `rotation`, `json`) become available after `path`.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: LoggerSettings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger, used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { name: WithName(name.into()), settings: self.settings, file: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes file records as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.settings.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Minimum level emitted when neither `RUST_LOG` nor [`Self::env_filter`] says otherwise.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `courier_account=debug,courier_event_bus=trace`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Sets the directory that receives rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.path = Some(path.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's [`WorkerGuard`]; keep it
    /// alive until shutdown so buffered records are flushed.
    ///
    /// # Errors
    /// * [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// * [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    /// * [`LoggerError::Appender`] if the rolling file appender cannot be created.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        self.settings.validate(&name)?;

        let filter = self.settings.env_filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.settings.console {
            layers.push(tracing_subscriber::fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.settings.path {
            Some(path) => {
                let (layer, guard) = file_layer(&self.settings, &name, path)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;
        tracing::debug!(logger = %name, file = guard.is_some(), "Logging initialized");

        Ok(Logger { guard })
    }
}

fn file_layer(
    settings: &LoggerSettings,
    name: &str,
    path: &Path,
) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(path).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create path: {}", path.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(settings.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(settings.max_files)
        .build(path)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
    let layer = if settings.json { layer.json().boxed() } else { layer.boxed() };

    Ok((layer, guard))
}

/// A handle to the initialized logging system.
///
/// Holds the background file writer, if any. Drop it only at shutdown.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use courier_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-game")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: NoName, file: PhantomData }
    }

    /// Initializes logging from the client's `[logging]` configuration section.
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`], plus
    /// [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggerError> {
        let settings = LoggerSettings::try_from(config)?;
        let builder = LoggerBuilder {
            settings,
            name: WithName(config.name.clone()),
            file: PhantomData::<NoFile>,
        };
        builder.init()
    }

    /// Returns a reference to the underlying worker guard, if present.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_logger_builder_initial_state() {
        let builder = Logger::builder().name("test-app").env_filter("courier=debug");
        assert!(builder.settings.console);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert_eq!(builder.settings.env_filter.as_deref(), Some("courier=debug"));
        assert!(builder.settings.path.is_none());
    }

    #[test]
    #[serial]
    fn test_logger_builder_configuration() {
        let tmp_dir = tempdir().unwrap();
        let log_dir = tmp_dir.path().join("logs");
        let builder = Logger::builder()
            .name("test-app")
            .console(false)
            .path(log_dir.clone())
            .max_files(5)
            .json()
            .level(LevelFilter::DEBUG);

        assert!(!builder.settings.console);
        assert!(builder.settings.json);
        assert_eq!(builder.settings.level, LevelFilter::DEBUG);
        assert_eq!(builder.settings.max_files, 5);
        assert_eq!(builder.settings.path.as_deref(), Some(log_dir.as_path()));
    }

    #[test]
    #[serial]
    fn test_no_layers_is_rejected() {
        let err = Logger::builder().name("silent").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn test_invalid_filter_is_rejected() {
        let err = Logger::builder().name("bad-filter").env_filter("courier=loud").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn test_file_logging_setup() {
        let tmp_dir = tempdir().unwrap();
        let log_dir = tmp_dir.path().join("logs");

        let logger = Logger::builder()
            .name("test-app")
            .console(false)
            .path(&log_dir)
            .level(LevelFilter::INFO)
            .init()
            .unwrap();

        tracing::info!("hello world");
        std::thread::sleep(Duration::from_millis(20));
        assert!(logger.guard().is_some());
        drop(logger);

        assert!(log_dir.exists(), "log directory should be created by logger init");
    }
}
