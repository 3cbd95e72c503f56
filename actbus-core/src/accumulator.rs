//! Per-call result state.
//!
//! An [`Accumulator`] is created fresh for every dispatch call and handed to
//! every handler of that call. Clones share state: a handler observes every
//! mutation made by the handlers before it.
//!
//! The lock is held only for the duration of a single mutation or read, never
//! across an `.await`.

use crate::phase::Phase;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Describes a handler failure recorded on the accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDescriptor {
    /// Human-readable failure message.
    pub message: String,
    /// Phase the failing handler ran in.
    pub phase: Phase,
    /// Label of the registration the handler belongs to, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    /// Name of the failing handler.
    pub handler: String,
}

/// An immutable view of an [`Accumulator`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<P> {
    /// Whether a handler reported success and no failure was recorded.
    pub success: bool,
    /// Result data contributed by handlers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The first failure of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
    /// The last payload rewrite of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_payload: Option<P>,
}

impl<P> Default for Snapshot<P> {
    fn default() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
            updated_payload: None,
        }
    }
}

impl<P> Snapshot<P> {
    /// Look up a top-level key of `data`.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref()?.get(key)
    }
}

struct State<P> {
    view: Snapshot<P>,
    // Set by `set_updated_payload`, cleared by `take_payload_update`.
    pending_update: bool,
}

/// Shared, mutable result state for one dispatch call.
pub struct Accumulator<P> {
    inner: Arc<Mutex<State<P>>>,
}

impl<P> Clone for Accumulator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> Default for Accumulator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for Accumulator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Accumulator")
            .field("success", &state.view.success)
            .field("data", &state.view.data)
            .field("error", &state.view.error)
            .field("updated_payload", &state.view.updated_payload.is_some())
            .finish()
    }
}

impl<P> Accumulator<P> {
    /// Create an accumulator holding the default result.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                view: Snapshot::default(),
                pending_update: false,
            })),
        }
    }

    /// Set `success` and replace `data`.
    ///
    /// Once a failure has been recorded the data is still replaced, but
    /// `success` stays `false`.
    pub fn mark_success(&self, data: impl Into<Value>) {
        let mut state = self.inner.lock();
        state.view.data = Some(data.into());
        state.view.success = state.view.error.is_none();
    }

    /// Set `success` without touching `data`. Ignored after a failure.
    pub fn succeed(&self) {
        let mut state = self.inner.lock();
        state.view.success = state.view.error.is_none();
    }

    /// Shallow-merge `partial` into `data`.
    ///
    /// Object keys of `partial` overwrite the same keys of `data`. A partial
    /// that is not an object replaces `data` outright, as does merging into
    /// data that is not an object.
    pub fn merge(&self, partial: impl Into<Value>) {
        let partial = partial.into();
        let mut state = self.inner.lock();

        let Value::Object(incoming) = partial else {
            state.view.data = Some(partial);
            return;
        };

        match state.view.data.as_mut() {
            Some(Value::Object(existing)) => existing.extend(incoming),
            _ => state.view.data = Some(Value::Object(incoming)),
        }
    }

    /// Rewrite the payload every later handler of this call receives.
    pub fn set_updated_payload(&self, payload: P) {
        let mut state = self.inner.lock();
        state.view.updated_payload = Some(payload);
        state.pending_update = true;
    }

    /// Record a handler failure.
    ///
    /// Clears `success`. Only the first failure is kept; returns `false` when
    /// an earlier failure was already recorded.
    pub fn record_failure(&self, error: ErrorDescriptor) -> bool {
        let mut state = self.inner.lock();
        state.view.success = false;
        if state.view.error.is_some() {
            return false;
        }
        state.view.error = Some(error);
        true
    }

    /// Whether the result currently reports success.
    pub fn is_success(&self) -> bool {
        self.inner.lock().view.success
    }

    /// Whether a failure has been recorded.
    pub fn has_failed(&self) -> bool {
        self.inner.lock().view.error.is_some()
    }

    /// A clone of the current `data`.
    pub fn data(&self) -> Option<Value> {
        self.inner.lock().view.data.clone()
    }

    /// Whether two handles refer to the same accumulator.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<P: Clone> Accumulator<P> {
    /// The current immutable view.
    pub fn snapshot(&self) -> Snapshot<P> {
        self.inner.lock().view.clone()
    }

    /// A clone of the current updated payload, if any.
    pub fn updated_payload(&self) -> Option<P> {
        self.inner.lock().view.updated_payload.clone()
    }

    /// Take the payload rewrite made since the last call, if any.
    ///
    /// The rewrite stays visible in [`snapshot`](Self::snapshot).
    pub fn take_payload_update(&self) -> Option<P> {
        let mut state = self.inner.lock();
        if !std::mem::take(&mut state.pending_update) {
            return None;
        }
        state.view.updated_payload.clone()
    }

    /// Consume the handle, returning the final view.
    pub fn into_snapshot(self) -> Snapshot<P> {
        match Arc::try_unwrap(self.inner) {
            Ok(state) => state.into_inner().view,
            Err(shared) => shared.lock().view.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(message: &str) -> ErrorDescriptor {
        ErrorDescriptor {
            message: message.to_owned(),
            phase: Phase::Main,
            registration: None,
            handler: "test".to_owned(),
        }
    }

    #[test]
    fn default_is_not_success() {
        let acc = Accumulator::<()>::new();
        assert_eq!(acc.snapshot(), Snapshot::default());
        assert!(!acc.is_success());
    }

    #[test]
    fn mark_success_sets_flag_and_data() {
        let acc = Accumulator::<()>::new();
        acc.mark_success(json!({"ok": 1}));
        let snap = acc.snapshot();
        assert!(snap.success);
        assert_eq!(snap.data, Some(json!({"ok": 1})));
    }

    #[test]
    fn merge_is_shallow() {
        let acc = Accumulator::<()>::new();
        acc.merge(json!({"a": {"x": 1}, "b": 1}));
        acc.merge(json!({"a": {"y": 2}}));
        assert_eq!(acc.data(), Some(json!({"a": {"y": 2}, "b": 1})));
    }

    #[test]
    fn merge_non_object_replaces() {
        let acc = Accumulator::<()>::new();
        acc.merge(json!({"a": 1}));
        acc.merge(json!([1, 2]));
        assert_eq!(acc.data(), Some(json!([1, 2])));
        acc.merge(json!({"b": 2}));
        assert_eq!(acc.data(), Some(json!({"b": 2})));
    }

    #[test]
    fn first_failure_wins() {
        let acc = Accumulator::<()>::new();
        acc.mark_success(json!(null));
        assert!(acc.record_failure(failure("first")));
        assert!(!acc.record_failure(failure("second")));

        let snap = acc.snapshot();
        assert!(!snap.success);
        assert_eq!(snap.error.unwrap().message, "first");
    }

    #[test]
    fn success_cannot_override_failure() {
        let acc = Accumulator::<()>::new();
        acc.record_failure(failure("boom"));
        acc.mark_success(json!({"late": true}));
        acc.succeed();

        let snap = acc.snapshot();
        assert!(!snap.success);
        assert_eq!(snap.data, Some(json!({"late": true})));
    }

    #[test]
    fn clones_share_state() {
        let acc = Accumulator::<u32>::new();
        let other = acc.clone();
        other.set_updated_payload(7);
        assert!(acc.ptr_eq(&other));
        assert_eq!(acc.updated_payload(), Some(7));
    }

    #[test]
    fn payload_update_is_taken_once() {
        let acc = Accumulator::<u32>::new();
        assert_eq!(acc.take_payload_update(), None);
        acc.set_updated_payload(1);
        assert_eq!(acc.take_payload_update(), Some(1));
        assert_eq!(acc.take_payload_update(), None);
        assert_eq!(acc.snapshot().updated_payload, Some(1));
    }

    #[test]
    fn snapshot_serializes_camel_case_and_skips_empty() {
        let acc = Accumulator::<Value>::new();
        acc.set_updated_payload(json!({"x": 1}));
        let value = serde_json::to_value(acc.into_snapshot()).unwrap();
        assert_eq!(value, json!({"success": false, "updatedPayload": {"x": 1}}));
    }
}
