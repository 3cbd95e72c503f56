//! The dispatch bus.
//!
//! [`Bus::run_all_matches`] resolves the registrations matching a routing
//! triple and runs their handlers strictly one after another:
//!
//! 1. phases in the order `Before → Main → After`
//! 2. within a phase, registrations in registration order
//! 3. within a registration, handlers in sequence order
//!
//! Every handler receives the current payload and the call's single
//! [`Accumulator`]. A payload rewrite becomes the current payload for every
//! later handler of the call, across phases.
//!
//! A failing handler (error or panic) is recorded on the accumulator and the
//! call carries on with the remaining handlers. Only the first failure is
//! kept; later ones are logged.
//!
//! The registry is loaded once per call from an [`ArcSwap`]. Swapping it
//! while calls are in flight is safe; those calls finish on the snapshot
//! they loaded.

use crate::{config::BusConfig, registry::Registry};
use actbus_core::{
    Accumulator, BusError, DynHandler, ErrorDescriptor, HandlerError, Payload, Phase, Route,
    Snapshot,
};
use arc_swap::ArcSwap;
use futures::FutureExt;
use std::{any::Any, fmt, panic::AssertUnwindSafe, sync::Arc};
use tracing::Instrument;

/// A pattern-routed, phase-ordered handler executor.
///
/// # Example
///
/// ```rust,ignore
/// let bus = Bus::new(registry);
///
/// let result = bus
///     .run_all_matches("discovery", "discoverOpenUiFeatures", "1.0.0", json!({}))
///     .await?;
/// ```
pub struct Bus<P: Payload> {
    registry: ArcSwap<Registry<P>>,
    config: BusConfig,
}

impl<P: Payload> Bus<P> {
    /// Create a bus over `registry` with the default configuration.
    pub fn new(registry: Registry<P>) -> Self {
        Self::with_config(registry, BusConfig::default())
    }

    /// Create a bus over `registry`.
    pub fn with_config(registry: Registry<P>, config: BusConfig) -> Self {
        Self {
            registry: ArcSwap::from_pointee(registry),
            config,
        }
    }

    /// The registry snapshot new calls will use.
    pub fn registry(&self) -> Arc<Registry<P>> {
        self.registry.load_full()
    }

    /// Atomically replace the registry, returning the previous snapshot.
    pub fn swap_registry(&self, registry: Registry<P>) -> Arc<Registry<P>> {
        let previous = self.registry.swap(Arc::new(registry));
        tracing::info!(registrations = self.registry.load().len(), "registry swapped");
        previous
    }

    /// The active configuration.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Run every matching handler for the triple, with no context filter.
    ///
    /// Fails only when a routing component is empty. Handler failures are
    /// reported through the returned snapshot.
    pub async fn run_all_matches(
        &self,
        namespace: &str,
        activity: &str,
        version: &str,
        payload: P,
    ) -> Result<Snapshot<P>, BusError> {
        let route = Route::new(namespace, activity, version)?;
        Ok(self.dispatch(&route, payload, None).await)
    }

    /// Run every matching handler for the triple whose context matcher
    /// accepts `context`.
    pub async fn run_all_matches_in(
        &self,
        namespace: &str,
        activity: &str,
        version: &str,
        payload: P,
        context: &str,
    ) -> Result<Snapshot<P>, BusError> {
        let route = Route::new(namespace, activity, version)?;
        Ok(self.dispatch(&route, payload, Some(context)).await)
    }

    /// Run every matching handler for an already validated route.
    pub async fn dispatch(&self, route: &Route, payload: P, context: Option<&str>) -> Snapshot<P> {
        let registry = self.registry.load_full();
        let span = tracing::debug_span!(
            "dispatch",
            namespace = route.namespace(),
            activity = route.activity(),
            version = route.version(),
        );

        self.execute(&registry, route, payload, context)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        registry: &Registry<P>,
        route: &Route,
        mut payload: P,
        context: Option<&str>,
    ) -> Snapshot<P> {
        let acc = Accumulator::new();
        let mut matched = 0usize;
        let mut executed = 0usize;
        let mut failures = 0usize;

        for phase in Phase::ORDER {
            for registration in registry.matches_for(phase, route, context) {
                matched += 1;

                for handler in registration.handlers() {
                    let name = handler.handler_name();
                    tracing::trace!(%phase, handler = name, "invoking handler");

                    let result = self.invoke(handler.as_ref(), payload.clone(), acc.clone()).await;
                    executed += 1;

                    match result {
                        Ok(Some(updated)) => acc.set_updated_payload(updated),
                        Ok(None) => {}
                        Err(err) => {
                            failures += 1;
                            let retained = acc.record_failure(ErrorDescriptor {
                                message: err.to_string(),
                                phase,
                                registration: registration.label().map(str::to_owned),
                                handler: name.to_owned(),
                            });
                            if retained {
                                tracing::warn!(%phase, handler = name, error = %err, "handler failed");
                            } else {
                                tracing::warn!(
                                    %phase,
                                    handler = name,
                                    error = %err,
                                    "handler failed; earlier failure retained"
                                );
                            }
                        }
                    }

                    if let Some(updated) = acc.take_payload_update() {
                        payload = updated;
                    }
                }
            }
        }

        let snapshot = acc.into_snapshot();
        tracing::debug!(
            matched,
            executed,
            failures,
            success = snapshot.success,
            "dispatch complete"
        );
        snapshot
    }

    async fn invoke(
        &self,
        handler: &dyn DynHandler<P>,
        payload: P,
        acc: Accumulator<P>,
    ) -> Result<Option<P>, HandlerError> {
        let call = handler.call_dyn(payload, acc);

        if !self.config.catch_panics {
            return call.await.map_err(HandlerError::Failed);
        }

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome.map_err(HandlerError::Failed),
            Err(panic) => Err(HandlerError::Panicked(panic_message(&*panic))),
        }
    }
}

impl<P: Payload> fmt::Debug for Bus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("registry", &*self.registry.load())
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
