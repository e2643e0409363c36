use courier_kernel::config::ConfigError;
use courier_logger::LoggerError;
use courier_prefs::PrefsError;
use std::borrow::Cow;

/// Errors raised while assembling a [`Courier`](crate::Courier) client.
#[courier_derive::courier_error]
pub enum CourierError {
    #[error("Configuration failed{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Preferences unavailable{}: {source}", format_context(.context))]
    Preferences { source: PrefsError, context: Option<Cow<'static, str>> },

    #[error("Logging setup failed{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },
}
