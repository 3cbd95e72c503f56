use actbus_core::{Accumulator, Handler, Payload};

/// Trait for payloads that carry distributed-tracing identifiers.
///
/// Implementing this trait allows the `TracingHandler` wrapper to link new spans to
/// parent spans propagated via the payload (e.g., from HTTP headers).
pub trait Traceable {
    /// Return the Trace ID if available (e.g. "4bf92f3577b34da6a3ce929d0e0e4736").
    fn trace_id(&self) -> Option<&str> {
        None
    }

    /// Return the Span ID of the parent span if available.
    fn span_id(&self) -> Option<&str> {
        None
    }
}

impl Traceable for serde_json::Value {
    fn trace_id(&self) -> Option<&str> {
        self.get("traceId")?.as_str()
    }

    fn span_id(&self) -> Option<&str> {
        self.get("spanId")?.as_str()
    }
}

/// A Handler wrapper that instruments execution with a `tracing` Span.
///
/// If the payload carries a trace id, the span records it.
pub struct TracingHandler<H> {
    inner: H,
    name: &'static str,
}

impl<H> TracingHandler<H> {
    /// Create a new `TracingHandler` wrapper around a handler.
    pub const fn new(inner: H, name: &'static str) -> Self {
        Self { inner, name }
    }
}

impl<H: Clone> Clone for TracingHandler<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: self.name,
        }
    }
}

#[cfg(feature = "tracing")]
use tracing::Instrument;

impl<P, H> Handler<P> for TracingHandler<H>
where
    P: Payload + Traceable,
    H: Handler<P>,
{
    type Output = H::Output;

    #[cfg(feature = "tracing")]
    async fn call(&self, payload: P, acc: Accumulator<P>) -> H::Output {
        let span = match payload.trace_id() {
            Some(trace_id) => tracing::info_span!(
                "activity_handler",
                handler = %self.name,
                trace_id = %trace_id,
                span_id = %payload.span_id().unwrap_or(""),
            ),
            None => tracing::info_span!("activity_handler", handler = %self.name),
        };

        self.inner.call(payload, acc).instrument(span).await
    }

    #[cfg(not(feature = "tracing"))]
    async fn call(&self, payload: P, acc: Accumulator<P>) -> H::Output {
        self.inner.call(payload, acc).await
    }

    fn name(&self) -> &str {
        self.name
    }
}
