//! TOML configuration.
//!
//! A configuration file carries the bus and router settings, the logging
//! setup, and a list of bindings. A binding names handlers by string; the
//! names are resolved against a [`HandlerTable`] supplied by the application,
//! since handlers themselves cannot be written in TOML.
//!
//! ```toml
//! [bus]
//! catch_panics = true
//!
//! [router]
//! default_version = "1.0.0"
//!
//! [[bindings]]
//! phase = "main"
//! label = "discovery"
//! namespace = "discovery"
//! activity = { pattern = "^discover" }
//! version = "*"
//! handlers = ["features"]
//! ```

use crate::{
    logging::LoggingConfig,
    registry::{Registration, Registry, SharedHandler},
    router::RouterConfig,
};
use actbus_core::{ConfigurationError, Handler, MatcherSpec, Payload, Phase};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// Errors raised while loading configuration or initialising from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The logging filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber was already installed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    /// A binding was rejected.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Settings of the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Catch handler panics and record them as failures.
    ///
    /// When disabled a panicking handler unwinds through the dispatch call.
    pub catch_panics: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { catch_panics: true }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `[bus]`
    pub bus: BusConfig,
    /// `[router]`
    pub router: RouterConfig,
    /// `[logging]`
    pub logging: LoggingConfig,
    /// `[[bindings]]`, in registration order.
    pub bindings: Vec<BindingConfig>,
}

impl Config {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Build a registry from the bindings.
    pub fn build_registry<P: Payload>(
        &self,
        table: &HandlerTable<P>,
    ) -> Result<Registry<P>, ConfigurationError> {
        Registry::from_bindings(&self.bindings, table)
    }
}

/// One `[[bindings]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Phase to register in. Defaults to `main`.
    #[serde(default)]
    pub phase: Phase,
    /// Label used in logs and error descriptors.
    #[serde(default)]
    pub label: Option<String>,
    /// Namespace matcher.
    pub namespace: Option<MatcherSpec>,
    /// Activity-name matcher.
    pub activity: Option<MatcherSpec>,
    /// Version matcher.
    pub version: Option<MatcherSpec>,
    /// Context matcher. Defaults to the wildcard.
    #[serde(default)]
    pub context: Option<MatcherSpec>,
    /// Handler names, in execution order.
    #[serde(default)]
    pub handlers: Vec<String>,
}

impl BindingConfig {
    /// Resolve matchers and handler names into a registration.
    pub fn to_registration<P: Payload>(
        &self,
        table: &HandlerTable<P>,
    ) -> Result<Registration<P>, ConfigurationError> {
        let mut builder = Registration::builder();

        if let Some(spec) = &self.namespace {
            builder = builder.namespace(spec.to_matcher()?);
        }
        if let Some(spec) = &self.activity {
            builder = builder.activity(spec.to_matcher()?);
        }
        if let Some(spec) = &self.version {
            builder = builder.version(spec.to_matcher()?);
        }
        if let Some(spec) = &self.context {
            builder = builder.context(spec.to_matcher()?);
        }
        if let Some(label) = &self.label {
            builder = builder.label(label.clone());
        }

        let handlers = self
            .handlers
            .iter()
            .map(|name| {
                table
                    .get(name)
                    .ok_or_else(|| ConfigurationError::UnknownHandler(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        builder.handlers(handlers).build()
    }
}

/// Named handlers that bindings refer to.
///
/// # Example
///
/// ```rust,ignore
/// let mut table = HandlerTable::new();
/// table
///     .insert("audit", LoggingHandler::new())
///     .insert("features", DiscoveryHandler::new(features));
///
/// let registry = config.build_registry(&table)?;
/// ```
pub struct HandlerTable<P: Payload> {
    handlers: HashMap<String, SharedHandler<P>>,
}

impl<P: Payload> Default for HandlerTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> HandlerTable<P> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Add a handler under `name`, replacing any handler of the same name.
    pub fn insert<H: Handler<P>>(&mut self, name: impl Into<String>, handler: H) -> &mut Self {
        let handler: SharedHandler<P> = Arc::new(handler);
        self.insert_shared(name, handler)
    }

    /// Add an already shared handler under `name`.
    pub fn insert_shared(&mut self, name: impl Into<String>, handler: SharedHandler<P>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// The handler registered as `name`.
    pub fn get(&self, name: &str) -> Option<SharedHandler<P>> {
        self.handlers.get(name).cloned()
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl<P: Payload> fmt::Debug for HandlerTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerTable").field("names", &names).finish()
    }
}

impl<P: Payload> Registry<P> {
    /// Build a registry from configuration bindings.
    ///
    /// Every binding is resolved before anything is registered, so an error
    /// leaves no partially populated registry behind.
    pub fn from_bindings(
        bindings: &[BindingConfig],
        table: &HandlerTable<P>,
    ) -> Result<Self, ConfigurationError> {
        let resolved = bindings
            .iter()
            .map(|binding| Ok((binding.phase, binding.to_registration(table)?)))
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        let mut registry = Self::new();
        for (phase, registration) in resolved {
            registry.register(phase, registration)?;
        }
        Ok(registry)
    }
}
