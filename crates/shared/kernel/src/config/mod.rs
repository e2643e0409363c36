use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "COURIER";

/// Base name of the config file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "courier";

/// Custom error type for config loading.
#[courier_derive::courier_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a file (e.g., `courier.toml`). An explicit path must
///    exist; without one, the optional `courier` file in the current working directory is used.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `COURIER__`.
///    Nested structures are accessed using double underscores (e.g., `COURIER__PROVIDER__TITLE_ID`
///    maps to `provider.title_id`).
///
/// # Type Parameters
/// * `T`: The target configuration structure. Must implement [`serde::Deserialize`].
///
/// # Errors
/// This function will return an error if:
/// * An explicitly given configuration file cannot be found.
/// * The content of the file does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use courier_kernel::config::load_config;
/// use courier_kernel::domain::config::ClientConfig;
///
/// let cfg: ClientConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .prefix_separator("__")
        .convert_case(config::Case::Snake);

    layered(path.as_ref().map(|p| p.as_ref()), environment)
}

fn layered<T>(path: Option<&Path>, environment: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), Path::to_path_buf);

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(environment);

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
