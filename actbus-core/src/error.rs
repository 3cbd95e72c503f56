//! Error types for actbus.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BusError`] - The only faults a dispatch call can surface
//! - [`RouteError`] - Malformed routing input
//! - [`ConfigurationError`] - Rejected registrations, raised at registration time
//! - [`HandlerError`] - A single handler invocation failed
//!
//! Handler failures never escape a dispatch call; they are folded into the
//! accumulator as an [`ErrorDescriptor`](crate::ErrorDescriptor).

use thiserror::Error;

/// A boxed error type for handler-facing error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a dispatch call can return to its caller.
#[derive(Error, Debug)]
pub enum BusError {
    /// The routing triple was incomplete or malformed.
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    /// A registration was rejected while the caller was setting up.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Errors describing malformed routing input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The namespace component was empty.
    #[error("missing namespace")]
    MissingNamespace,

    /// The activity name component was empty.
    #[error("missing activity name")]
    MissingActivity,

    /// The version component was empty.
    #[error("missing version")]
    MissingVersion,

    /// An inbound path could not be split into namespace and activity.
    #[error("malformed activity path: {0}")]
    MalformedPath(String),
}

/// Errors raised when a registration is rejected.
///
/// A rejected registration never enters the registry.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A matcher specification named a kind the bus does not know.
    #[error("unknown matcher kind `{0}`")]
    UnknownMatcherKind(String),

    /// A matcher specification was structurally invalid.
    #[error("invalid matcher specification: {0}")]
    InvalidMatcher(String),

    /// A pattern matcher did not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending expression.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// One of the namespace, activity or version matchers was not supplied.
    #[error("registration is missing its {0} matcher")]
    MissingMatcher(&'static str),

    /// The registration carried no handlers.
    #[error("registration `{0}` has no handlers")]
    NoHandlers(String),

    /// A configured binding referred to a handler name nobody provided.
    #[error("unknown handler `{0}`")]
    UnknownHandler(String),
}

/// Errors raised by a single handler invocation.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error(transparent)]
    Failed(BoxError),

    /// The handler panicked while running.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Failed(err)
    }
}
