//! UI feature registry and the discovery handler that reports it.
//!
//! Feature modules register [`FeatureDescriptor`]s at start-up. A
//! [`DiscoveryHandler`] bound to the discovery activity appends the registered
//! list to `data.features` of the call's accumulator, so several registries
//! fanned out to the same triple contribute to one response.

use actbus_core::{Accumulator, BoxError, Handler, Payload};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Key under which discovery results are accumulated.
pub const FEATURES_KEY: &str = "features";

/// A UI feature exposed by a capability module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Display name of the feature.
    pub name: String,
    /// Version of the feature.
    pub version: String,
    /// Any further descriptor fields, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureDescriptor {
    /// A descriptor with no extra fields.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra descriptor field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Destination registered features are forwarded to, e.g. a remote
/// registration endpoint.
#[async_trait]
pub trait FeatureSink: Send + Sync {
    /// Forward one descriptor.
    async fn publish(&self, feature: &FeatureDescriptor) -> Result<(), BoxError>;
}

/// An ordered, append-only list of feature descriptors.
#[derive(Default)]
pub struct FeatureRegistry {
    features: RwLock<Vec<FeatureDescriptor>>,
    sink: Option<Arc<dyn FeatureSink>>,
}

impl FeatureRegistry {
    /// Create an empty registry that keeps features locally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that also forwards every registered feature.
    pub fn with_sink(sink: Arc<dyn FeatureSink>) -> Self {
        Self {
            features: RwLock::new(Vec::new()),
            sink: Some(sink),
        }
    }

    /// Append a feature, forwarding it to the sink when one is configured.
    ///
    /// The feature is kept locally even when forwarding fails.
    pub async fn register_feature(&self, feature: FeatureDescriptor) -> Result<(), BoxError> {
        self.features.write().push(feature.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!(name = %feature.name, version = %feature.version, "feature registered");

        match &self.sink {
            Some(sink) => sink.publish(&feature).await,
            None => Ok(()),
        }
    }

    /// The registered features, in registration order.
    pub fn get_features(&self) -> Vec<FeatureDescriptor> {
        self.features.read().clone()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    /// Whether no feature has been registered.
    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }
}

/// Reports a [`FeatureRegistry`] through the accumulator.
///
/// Appends the registry's features to any `data.features` list already
/// contributed earlier in the call, then flags success.
#[derive(Clone)]
pub struct DiscoveryHandler {
    registry: Arc<FeatureRegistry>,
}

impl DiscoveryHandler {
    /// Create a discovery handler over a shared registry.
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }
}

impl<P: Payload> Handler<P> for DiscoveryHandler {
    type Output = Result<(), serde_json::Error>;

    async fn call(&self, _payload: P, acc: Accumulator<P>) -> Self::Output {
        let mut features = match acc.data().as_ref().and_then(|d| d.get(FEATURES_KEY)) {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        for feature in self.registry.get_features() {
            features.push(serde_json::to_value(feature)?);
        }

        let mut partial = Map::new();
        partial.insert(FEATURES_KEY.to_owned(), Value::Array(features));
        acc.merge(Value::Object(partial));
        acc.succeed();
        Ok(())
    }

    fn name(&self) -> &str {
        "discovery"
    }
}
