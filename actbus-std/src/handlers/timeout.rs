//! Timeout Handler - Time-limited execution of a single handler.
//!
//! The bus itself imposes no deadlines. A capability owner that wants to
//! bound one of its own handlers wraps it here; the expiry is then reported
//! like any other handler failure.

use actbus_core::{Accumulator, Handler, IntoOutcome, Outcome, Payload};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Error returned when a handler times out.
#[derive(Debug, Clone, Error)]
#[error("handler `{name}` timed out after {elapsed:?}")]
pub struct TimeoutError {
    /// Name of the handler that timed out.
    pub name: String,
    /// The configured limit.
    pub elapsed: Duration,
}

/// A Handler that wraps another Handler with a timeout.
///
/// # Example
///
/// ```rust,ignore
/// use actbus_std::handlers::TimeoutHandler;
/// use std::time::Duration;
///
/// let bounded = TimeoutHandler::new(ManifestPublisher::new(url), Duration::from_secs(5));
/// ```
pub struct TimeoutHandler<H> {
    inner: H,
    duration: Duration,
}

impl<H> TimeoutHandler<H> {
    /// Create a new `TimeoutHandler`.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<P: Payload, H: Handler<P>> Handler<P> for TimeoutHandler<H> {
    type Output = Outcome<P>;

    async fn call(&self, payload: P, acc: Accumulator<P>) -> Outcome<P> {
        match timeout(self.duration, self.inner.call(payload, acc)).await {
            Ok(output) => output.into_outcome(),
            Err(_) => Err(Box::new(TimeoutError {
                name: self.inner.name().to_owned(),
                elapsed: self.duration,
            })),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
