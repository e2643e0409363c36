use crate::completion::Pending;
use crate::error::BridgeError;
use std::any::type_name;
use std::future::Future;
use tracing::{debug, warn};

/// Awaits `primary`, then optionally runs a best-effort follow-up.
///
/// `primary` is usually a [`Pending`] handle, possibly wrapped by
/// [`Pending::timeout`].
///
/// * A primary failure is returned as-is and the follow-up never runs.
/// * A follow-up failure is logged at `warn` and swallowed; the primary
///   value is still returned.
/// * With no follow-up, the primary outcome is returned unchanged.
///
/// The follow-up receives the primary value by reference and must clone
/// whatever it needs into the future it returns.
///
/// # Errors
/// Returns the primary operation's error.
pub async fn chain_best_effort<T, U, P, F, Fut>(
    primary: P,
    secondary: Option<F>,
) -> Result<T, BridgeError>
where
    P: Future<Output = Result<T, BridgeError>>,
    F: FnOnce(&T) -> Fut,
    Fut: Future<Output = Result<U, BridgeError>>,
{
    let value = primary.await?;

    let Some(secondary) = secondary else {
        return Ok(value);
    };

    match secondary(&value).await {
        Ok(_) => debug!(event = type_name::<T>(), "Best-effort follow-up completed"),
        Err(err) => warn!(
            event = type_name::<T>(),
            error = %err,
            "Best-effort follow-up failed; keeping primary result"
        ),
    }
    Ok(value)
}

impl<T> Pending<T> {
    /// Method form of [`chain_best_effort`] with a follow-up that always runs
    /// when the primary operation succeeds.
    ///
    /// # Errors
    /// Returns the primary operation's error.
    pub async fn then_best_effort<U, F, Fut>(self, secondary: F) -> Result<T, BridgeError>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = Result<U, BridgeError>>,
    {
        chain_best_effort(self, Some(secondary)).await
    }
}
