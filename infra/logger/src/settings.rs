use crate::LevelFilter;
use crate::error::LoggerError;
use courier_domain::config::{LogRotation, LoggingConfig};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_FILES: usize = 10;

#[derive(Debug)]
pub(crate) struct LoggerSettings {
    pub(crate) console: bool,
    pub(crate) path: Option<PathBuf>,
    pub(crate) level: LevelFilter,
    pub(crate) rotation: Rotation,
    pub(crate) max_files: usize,
    pub(crate) json: bool,
    pub(crate) env_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

impl LoggerSettings {
    pub(crate) fn validate(&self, name: &str) -> Result<(), LoggerError> {
        if name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    /// Explicit directives win; otherwise `RUST_LOG` over the default level.
    pub(crate) fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.env_filter {
            None => Ok(builder.from_env_lossy()),
            Some(filter) => builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            }),
        }
    }
}

impl TryFrom<&LoggingConfig> for LoggerSettings {
    type Error = LoggerError;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        let level = LevelFilter::from_str(config.level.trim()).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Unknown log level '{}': {e}", config.level).into(),
                context: Some("logging.level".into()),
            }
        })?;

        Ok(Self {
            console: config.console,
            path: config.directory.clone(),
            level,
            rotation: rotation(config.rotation),
            max_files: config.max_files,
            json: config.json,
            env_filter: config.filter.clone(),
        })
    }
}

const fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}
