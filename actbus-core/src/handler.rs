//! # Handlers
//!
//! A handler is the unit of work a registration binds to a routing triple.
//! It receives its own clone of the current payload and a handle to the
//! call's [`Accumulator`], and returns something convertible into an
//! [`Outcome`].
//!
//! # Usage Patterns
//!
//! 1. **Direct closure**: `|payload, acc| async move { ... }`
//! 2. **Struct implementation**: `impl Handler<MyPayload> for MyHandler`
//!
//! The bus stores handlers as [`DynHandler`] trait objects; every
//! [`Handler`] is a [`DynHandler`] through a blanket impl.

use crate::{
    accumulator::Accumulator,
    outcome::{IntoOutcome, Outcome},
    payload::Payload,
};
use std::{future::Future, pin::Pin};

/// An asynchronous capability handler.
///
/// The bus awaits each handler to completion before starting the next one,
/// so a handler may perform I/O freely.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn` for static dispatch. For storage in a
/// registry, use [`DynHandler`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle payloads of type `{P}`",
    label = "missing `Handler<{P}>` implementation",
    note = "Handlers are `Fn(P, Accumulator<P>) -> impl Future` closures or types implementing `Handler<{P}>`."
)]
pub trait Handler<P: Payload>: Send + Sync + 'static {
    /// The handler's return type, converted through [`IntoOutcome`].
    type Output: IntoOutcome<P>;

    /// Executes the handler logic.
    fn call(&self, payload: P, acc: Accumulator<P>) -> impl Future<Output = Self::Output> + Send;

    /// Name used in logs and error descriptors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// Blanket impl for closures
impl<F, P, Fut, O> Handler<P> for F
where
    P: Payload,
    O: IntoOutcome<P>,
    F: Fn(P, Accumulator<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = O> + Send,
{
    type Output = O;

    fn call(&self, payload: P, acc: Accumulator<P>) -> impl Future<Output = Self::Output> + Send {
        (self)(payload, acc)
    }
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler<P: Payload>: Send + Sync + 'static {
    /// Executes the handler (dynamic dispatch version).
    fn call_dyn<'a>(
        &'a self,
        payload: P,
        acc: Accumulator<P>,
    ) -> Pin<Box<dyn Future<Output = Outcome<P>> + Send + 'a>>;

    /// Name used in logs and error descriptors.
    fn handler_name(&self) -> &str;
}

// Blanket implementation: Any type implementing Handler implements DynHandler automatically.
impl<P: Payload, H: Handler<P>> DynHandler<P> for H {
    fn call_dyn<'a>(
        &'a self,
        payload: P,
        acc: Accumulator<P>,
    ) -> Pin<Box<dyn Future<Output = Outcome<P>> + Send + 'a>> {
        Box::pin(async move { self.call(payload, acc).await.into_outcome() })
    }

    fn handler_name(&self) -> &str {
        self.name()
    }
}
