//! Logging handler for dispatch observation.

use actbus_core::{Accumulator, Handler, Payload};
use std::fmt::Debug;

/// A handler that logs the payload it receives and contributes nothing.
///
/// Typically registered in the `Before` phase as an audit step.
///
/// # Example
///
/// ```rust,ignore
/// registry.register(
///     Phase::Before,
///     Registration::new("*", "*", "*", LoggingHandler::named("audit")),
/// )?;
/// ```
pub struct LoggingHandler {
    name: &'static str,
}

impl LoggingHandler {
    /// Create a new `LoggingHandler` with a default name.
    pub fn new() -> Self {
        Self { name: "audit" }
    }

    /// Create a new `LoggingHandler` with a custom name.
    ///
    /// The name is used in log messages to identify the capability.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload + Debug> Handler<P> for LoggingHandler {
    type Output = ();

    async fn call(&self, payload: P, acc: Accumulator<P>) {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                name = %self.name,
                ?payload,
                failed = acc.has_failed(),
                "activity observed"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (payload, acc); // Suppress unused warning
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}
