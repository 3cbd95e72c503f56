//! Standard handler implementations.

pub mod conditional;
pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;
/// Span instrumentation for handlers.
pub mod tracing;

pub use conditional::ConditionalHandler;
pub use logging::LoggingHandler;
#[cfg(feature = "timeout")]
pub use timeout::{TimeoutError, TimeoutHandler};
pub use self::tracing::{Traceable, TracingHandler};
