//! Conditional Handler - Run a handler only for some payloads.

use actbus_core::{Accumulator, Handler, IntoOutcome, Outcome, Payload};

/// A Handler that conditionally executes an inner Handler.
///
/// The inner handler only runs when the condition holds for the payload.
/// Otherwise the call contributes nothing and leaves the payload as it was.
///
/// # Example
///
/// ```rust,ignore
/// use actbus_std::handlers::ConditionalHandler;
///
/// // Only publish manifests that declare at least one feature
/// let publish = ConditionalHandler::new(
///     |manifest: &Manifest| !manifest.features.is_empty(),
///     PublishManifest::new(endpoint),
/// );
/// ```
pub struct ConditionalHandler<C, H> {
    condition: C,
    inner: H,
}

impl<C, H> ConditionalHandler<C, H> {
    /// Create a new `ConditionalHandler`.
    ///
    /// The inner handler will only be executed when `condition(payload)` returns `true`.
    pub fn new(condition: C, inner: H) -> Self {
        Self { condition, inner }
    }
}

impl<P, C, H> Handler<P> for ConditionalHandler<C, H>
where
    P: Payload,
    C: Fn(&P) -> bool + Send + Sync + 'static,
    H: Handler<P>,
{
    type Output = Outcome<P>;

    async fn call(&self, payload: P, acc: Accumulator<P>) -> Outcome<P> {
        if (self.condition)(&payload) {
            self.inner.call(payload, acc).await.into_outcome()
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
