//! Registry module for activity registrations.
//!
//! A [`Registration`] binds three routing matchers (plus an optional context
//! matcher) to an ordered handler sequence. The [`Registry`] keeps
//! registrations per [`Phase`] in insertion order; nothing is ever reordered,
//! deduplicated or removed.
//!
//! Registration happens before a registry is handed to a
//! [`Bus`](crate::Bus). `register` takes `&mut self`, so a registry shared
//! with a serving bus cannot be mutated; build a new one and swap it in.

use actbus_core::{ConfigurationError, DynHandler, Handler, Matcher, Payload, Phase, Route};
use std::{fmt, sync::Arc};

/// A shared, type-erased handler.
pub type SharedHandler<P> = Arc<dyn DynHandler<P>>;

/// An immutable binding of matchers to an ordered handler sequence.
pub struct Registration<P: Payload> {
    namespace: Matcher,
    activity: Matcher,
    version: Matcher,
    context: Matcher,
    handlers: Vec<SharedHandler<P>>,
    label: Option<String>,
}

impl<P: Payload> Registration<P> {
    /// A registration with a single handler and a wildcard context.
    pub fn new<H: Handler<P>>(
        namespace: impl Into<Matcher>,
        activity: impl Into<Matcher>,
        version: impl Into<Matcher>,
        handler: H,
    ) -> Self {
        let handler: SharedHandler<P> = Arc::new(handler);
        Self {
            namespace: namespace.into(),
            activity: activity.into(),
            version: version.into(),
            context: Matcher::any(),
            handlers: vec![handler],
            label: None,
        }
    }

    /// Start building a registration.
    pub fn builder() -> RegistrationBuilder<P> {
        RegistrationBuilder::new()
    }

    /// Replace the context matcher.
    pub fn with_context(mut self, context: impl Into<Matcher>) -> Self {
        self.context = context.into();
        self
    }

    /// Label the registration for logs and error descriptors.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether all four matchers accept the given input.
    ///
    /// A `None` context skips the context matcher.
    pub fn matches(&self, route: &Route, context: Option<&str>) -> bool {
        self.namespace.matches(route.namespace())
            && self.activity.matches(route.activity())
            && self.version.matches(route.version())
            && context.is_none_or(|ctx| self.context.matches(ctx))
    }

    /// The handler sequence, in execution order.
    pub fn handlers(&self) -> &[SharedHandler<P>] {
        &self.handlers
    }

    /// Optional label used in logs and error descriptors.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The namespace matcher.
    pub fn namespace(&self) -> &Matcher {
        &self.namespace
    }

    /// The activity-name matcher.
    pub fn activity(&self) -> &Matcher {
        &self.activity
    }

    /// The version matcher.
    pub fn version(&self) -> &Matcher {
        &self.version
    }

    /// The context matcher.
    pub fn context(&self) -> &Matcher {
        &self.context
    }
}

impl<P: Payload> fmt::Debug for Registration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("label", &self.label)
            .field("namespace", &self.namespace)
            .field("activity", &self.activity)
            .field("version", &self.version)
            .field("context", &self.context)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Builder for a [`Registration`].
///
/// # Example
/// ```ignore
/// let registration = Registration::builder()
///     .namespace("discovery")
///     .activity(Matcher::pattern("^discover")?)
///     .version("*")
///     .handler(validate)
///     .handler(respond)
///     .build()?;
/// ```
pub struct RegistrationBuilder<P: Payload> {
    namespace: Option<Matcher>,
    activity: Option<Matcher>,
    version: Option<Matcher>,
    context: Option<Matcher>,
    handlers: Vec<SharedHandler<P>>,
    label: Option<String>,
}

impl<P: Payload> Default for RegistrationBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> RegistrationBuilder<P> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            namespace: None,
            activity: None,
            version: None,
            context: None,
            handlers: Vec::new(),
            label: None,
        }
    }

    /// Set the namespace matcher.
    pub fn namespace(mut self, matcher: impl Into<Matcher>) -> Self {
        self.namespace = Some(matcher.into());
        self
    }

    /// Set the activity-name matcher.
    pub fn activity(mut self, matcher: impl Into<Matcher>) -> Self {
        self.activity = Some(matcher.into());
        self
    }

    /// Set the version matcher.
    pub fn version(mut self, matcher: impl Into<Matcher>) -> Self {
        self.version = Some(matcher.into());
        self
    }

    /// Set the context matcher. Defaults to the wildcard.
    pub fn context(mut self, matcher: impl Into<Matcher>) -> Self {
        self.context = Some(matcher.into());
        self
    }

    /// Label the registration for logs and error descriptors.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a handler to the sequence.
    pub fn handler<H: Handler<P>>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Append already-shared handlers, preserving their order.
    pub fn handlers<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = SharedHandler<P>>,
    {
        self.handlers.extend(handlers);
        self
    }

    /// Validate and build the registration.
    pub fn build(self) -> Result<Registration<P>, ConfigurationError> {
        let namespace = self
            .namespace
            .ok_or(ConfigurationError::MissingMatcher("namespace"))?;
        let activity = self
            .activity
            .ok_or(ConfigurationError::MissingMatcher("activity"))?;
        let version = self
            .version
            .ok_or(ConfigurationError::MissingMatcher("version"))?;

        if self.handlers.is_empty() {
            let name = self
                .label
                .unwrap_or_else(|| format!("{namespace:?}/{activity:?}@{version:?}"));
            return Err(ConfigurationError::NoHandlers(name));
        }

        Ok(Registration {
            namespace,
            activity,
            version,
            context: self.context.unwrap_or_default(),
            handlers: self.handlers,
            label: self.label,
        })
    }
}

/// Conversion into a validated [`Registration`].
///
/// Lets [`Registry::register`] accept either a finished registration or a
/// builder, surfacing builder validation errors from `register` itself.
pub trait IntoRegistration<P: Payload> {
    /// Validate and convert.
    fn into_registration(self) -> Result<Registration<P>, ConfigurationError>;
}

impl<P: Payload> IntoRegistration<P> for Registration<P> {
    fn into_registration(self) -> Result<Registration<P>, ConfigurationError> {
        Ok(self)
    }
}

impl<P: Payload> IntoRegistration<P> for RegistrationBuilder<P> {
    fn into_registration(self) -> Result<Registration<P>, ConfigurationError> {
        self.build()
    }
}

/// Ordered registrations, partitioned by phase.
///
/// # Example
/// ```ignore
/// let mut registry = Registry::new();
/// registry
///     .register(Phase::Before, Registration::new("*", "*", "*", LoggingHandler::new()))?
///     .register(Phase::Main, Registration::new("discovery", "discoverOpenUiFeatures", "1.0.0", discovery))?;
///
/// let bus = Bus::new(registry);
/// ```
pub struct Registry<P: Payload> {
    phases: [Vec<Registration<P>>; 3],
}

impl<P: Payload> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> Registry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            phases: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Append a registration to `phase`.
    ///
    /// A rejected registration never enters the registry.
    pub fn register(
        &mut self,
        phase: Phase,
        registration: impl IntoRegistration<P>,
    ) -> Result<&mut Self, ConfigurationError> {
        let registration = registration.into_registration()?;

        tracing::debug!(
            %phase,
            label = registration.label().unwrap_or(""),
            handlers = registration.handlers().len(),
            "activity registered"
        );

        self.phases[phase.index()].push(registration);
        Ok(self)
    }

    /// The registrations of `phase` that match the input, in registration order.
    pub fn matches_for<'a>(
        &'a self,
        phase: Phase,
        route: &'a Route,
        context: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Registration<P>> + Send + 'a {
        self.phases[phase.index()]
            .iter()
            .filter(move |registration| registration.matches(route, context))
    }

    /// All registrations of `phase`, in registration order.
    pub fn phase(&self, phase: Phase) -> &[Registration<P>] {
        &self.phases[phase.index()]
    }

    /// Total number of registrations across phases.
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }
}

impl<P: Payload> fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("before", &self.phases[Phase::Before.index()].len())
            .field("main", &self.phases[Phase::Main.index()].len())
            .field("after", &self.phases[Phase::After.index()].len())
            .finish()
    }
}
