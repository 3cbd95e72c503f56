//! Testing utilities for actbus.
//!
//! This module provides handler doubles to make testing registrations and
//! dispatch behaviour easier.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every payload it receives
//! - [`CountingHandler`]: counts invocations
//! - [`FailingHandler`]: always fails with a fixed message
//! - [`RewriteHandler`]: rewrites the payload through the accumulator
//! - [`OrderLog`]: a shared log for asserting execution order

use actbus_core::{Accumulator, BoxError, Handler, HandlerResult, Payload};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records all payloads it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<MyPayload>::new();
///
/// registry.register(Phase::Main, Registration::new("*", "*", "*", recorder.clone()))?;
/// bus.run_all_matches("ns", "act", "1.0.0", payload).await?;
///
/// assert_eq!(recorder.payloads().len(), 1);
/// ```
pub struct RecordingHandler<P> {
    payloads: Arc<Mutex<Vec<P>>>,
}

impl<P> RecordingHandler<P> {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of recorded payloads.
    pub fn count(&self) -> usize {
        self.payloads.lock().len()
    }

    /// Clear all recorded payloads.
    pub fn clear(&self) {
        self.payloads.lock().clear();
    }
}

impl<P: Clone> RecordingHandler<P> {
    /// Get a clone of the recorded payloads.
    pub fn payloads(&self) -> Vec<P> {
        self.payloads.lock().clone()
    }
}

impl<P> Default for RecordingHandler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for RecordingHandler<P> {
    fn clone(&self) -> Self {
        Self {
            payloads: self.payloads.clone(),
        }
    }
}

impl<P: Payload> Handler<P> for RecordingHandler<P> {
    type Output = ();

    async fn call(&self, payload: P, _acc: Accumulator<P>) {
        self.payloads.lock().push(payload);
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<P: Payload> Handler<P> for CountingHandler {
    type Output = ();

    async fn call(&self, _payload: P, _acc: Accumulator<P>) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always fails with the same message.
#[derive(Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a failing handler.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<P: Payload> Handler<P> for FailingHandler {
    type Output = HandlerResult;

    async fn call(&self, _payload: P, _acc: Accumulator<P>) -> HandlerResult {
        Err(BoxError::from(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ============================================================================
// Rewrite Handler
// ============================================================================

/// A handler that rewrites the payload through the accumulator field.
pub struct RewriteHandler<F> {
    rewrite: F,
}

impl<F> RewriteHandler<F> {
    /// Create a handler that replaces the payload with `rewrite(payload)`.
    pub fn new(rewrite: F) -> Self {
        Self { rewrite }
    }
}

impl<P, F> Handler<P> for RewriteHandler<F>
where
    P: Payload,
    F: Fn(P) -> P + Send + Sync + 'static,
{
    type Output = ();

    async fn call(&self, payload: P, acc: Accumulator<P>) {
        acc.set_updated_payload((self.rewrite)(payload));
    }

    fn name(&self) -> &str {
        "rewrite"
    }
}

// ============================================================================
// Order Log
// ============================================================================

/// A shared log of handler labels, for asserting execution order.
///
/// # Example
///
/// ```rust,ignore
/// let log = OrderLog::new();
/// registry.register(Phase::Before, Registration::new("*", "*", "*", log.handler("before")))?;
/// registry.register(Phase::Main, Registration::new("*", "*", "*", log.handler("main")))?;
///
/// bus.run_all_matches("ns", "act", "1.0.0", ()).await?;
/// assert_eq!(log.entries(), ["before", "main"]);
/// ```
#[derive(Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that appends `label` to this log when it runs.
    pub fn handler(&self, label: impl Into<String>) -> OrderEntry {
        OrderEntry {
            label: label.into(),
            log: self.clone(),
        }
    }

    /// Append a label directly.
    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    /// The labels recorded so far.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// A handler produced by [`OrderLog::handler`].
#[derive(Clone)]
pub struct OrderEntry {
    label: String,
    log: OrderLog,
}

impl<P: Payload> Handler<P> for OrderEntry {
    type Output = ();

    async fn call(&self, _payload: P, _acc: Accumulator<P>) {
        self.log.push(self.label.clone());
    }

    fn name(&self) -> &str {
        &self.label
    }
}
