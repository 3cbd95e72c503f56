#![allow(dead_code)]

use actbus::{Accumulator, Handler, Matcher, Phase, Registration, Registry, Updated};
use serde_json::{Value, json};

// ============================================================================
// Test Payloads
// ============================================================================

pub const DISCOVERY: (&str, &str, &str) = ("discovery", "discoverOpenUiFeatures", "1.0.0");

pub fn empty() -> Value {
    json!({})
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Appends its tag to `payload.trail` and hands the result on.
pub struct TrailHandler {
    pub tag: &'static str,
}

impl Handler<Value> for TrailHandler {
    type Output = Updated<Value>;

    async fn call(&self, mut payload: Value, _acc: Accumulator<Value>) -> Updated<Value> {
        let trail = payload
            .as_object_mut()
            .map(|object| object.entry("trail").or_insert_with(|| json!([])));
        if let Some(Value::Array(trail)) = trail {
            trail.push(json!(self.tag));
        }
        Updated(payload)
    }

    fn name(&self) -> &str {
        self.tag
    }
}

// ============================================================================
// Registry Helpers
// ============================================================================

/// A registry with one registration on the discovery namespace and activity.
pub fn single<H: Handler<Value>>(
    phase: Phase,
    version: impl Into<Matcher>,
    handler: H,
) -> Registry<Value> {
    let (namespace, activity, _) = DISCOVERY;
    let mut registry = Registry::new();
    registry
        .register(phase, Registration::new(namespace, activity, version, handler))
        .unwrap();
    registry
}
