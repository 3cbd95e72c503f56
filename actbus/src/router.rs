//! The inbound surface in front of a [`Bus`].
//!
//! An external request router hands over a path such as
//! `/api/discovery/discoverOpenUiFeatures` and a payload. The
//! [`ActivityRouter`] splits the path into namespace and activity name, fills
//! in the configured default version, dispatches, and wraps the snapshot in
//! the response [`Envelope`].

use crate::bus::Bus;
use actbus_core::{BusError, Payload, Route, RouteError, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `[router]` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Version used when a request does not name one.
    pub default_version: String,
    /// Prefix stripped from inbound paths before splitting them.
    pub path_prefix: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_version: "1.0.0".to_owned(),
            path_prefix: None,
        }
    }
}

/// A decoded inbound request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest<P> {
    /// Namespace of the activity.
    pub namespace: String,
    /// Activity name.
    pub activity_name: String,
    /// Version; the router default applies when absent.
    #[serde(default)]
    pub version: Option<String>,
    /// Optional context filter.
    #[serde(default)]
    pub context: Option<String>,
    /// Request payload.
    pub payload: P,
}

/// Response status. Handler failures are reported inside the result, so
/// the envelope status is always `ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The dispatch call completed.
    Ok,
}

/// The response body returned to the external router.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<P> {
    /// Always [`Status::Ok`].
    pub status: Status,
    /// The final accumulator snapshot.
    pub service_result: Snapshot<P>,
}

impl<P> Envelope<P> {
    /// Wrap a snapshot.
    pub fn ok(service_result: Snapshot<P>) -> Self {
        Self {
            status: Status::Ok,
            service_result,
        }
    }
}

/// Adapts inbound requests to [`Bus`] calls.
pub struct ActivityRouter<P: Payload> {
    bus: Arc<Bus<P>>,
    config: RouterConfig,
}

impl<P: Payload> ActivityRouter<P> {
    /// Create a router with the default settings.
    pub fn new(bus: Arc<Bus<P>>) -> Self {
        Self::with_config(bus, RouterConfig::default())
    }

    /// Create a router.
    pub fn with_config(bus: Arc<Bus<P>>, config: RouterConfig) -> Self {
        Self { bus, config }
    }

    /// The bus requests are dispatched to.
    pub fn bus(&self) -> &Arc<Bus<P>> {
        &self.bus
    }

    /// Split `path` into `(namespace, activity name)`.
    ///
    /// The configured prefix is stripped first. Exactly two non-empty
    /// segments must remain; leading and trailing slashes are ignored.
    pub fn parse_path<'p>(&self, path: &'p str) -> Result<(&'p str, &'p str), RouteError> {
        let malformed = || RouteError::MalformedPath(path.to_owned());

        let rest = match self.config.path_prefix.as_deref() {
            Some(prefix) => {
                let rest = path.strip_prefix(prefix).ok_or_else(malformed)?;
                // The prefix must end on a segment boundary.
                if !(prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/')) {
                    return Err(malformed());
                }
                rest
            }
            None => path,
        };

        let mut segments = rest.trim_matches('/').split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(namespace), Some(activity), None)
                if !namespace.is_empty() && !activity.is_empty() =>
            {
                Ok((namespace, activity))
            }
            _ => Err(malformed()),
        }
    }

    /// Dispatch a decoded request.
    pub async fn handle(&self, request: ActivityRequest<P>) -> Result<Envelope<P>, BusError> {
        let version = request
            .version
            .as_deref()
            .unwrap_or(&self.config.default_version);
        let route = Route::new(&request.namespace, &request.activity_name, version)?;

        let snapshot = self
            .bus
            .dispatch(&route, request.payload, request.context.as_deref())
            .await;
        Ok(Envelope::ok(snapshot))
    }

    /// Dispatch a request addressed by path.
    pub async fn handle_path(
        &self,
        path: &str,
        version: Option<&str>,
        payload: P,
    ) -> Result<Envelope<P>, BusError> {
        let (namespace, activity) = self.parse_path(path)?;
        self.handle(ActivityRequest {
            namespace: namespace.to_owned(),
            activity_name: activity.to_owned(),
            version: version.map(str::to_owned),
            context: None,
            payload,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn router(prefix: Option<&str>) -> ActivityRouter<()> {
        ActivityRouter::with_config(
            Arc::new(Bus::new(Registry::new())),
            RouterConfig {
                path_prefix: prefix.map(str::to_owned),
                ..RouterConfig::default()
            },
        )
    }

    #[test]
    fn parse_path_splits_segments() {
        let router = router(None);
        assert_eq!(
            router.parse_path("/discovery/discoverOpenUiFeatures/").unwrap(),
            ("discovery", "discoverOpenUiFeatures")
        );
    }

    #[test]
    fn parse_path_strips_prefix() {
        let prefixed = router(Some("/api"));
        assert_eq!(prefixed.parse_path("/api/ns/act").unwrap(), ("ns", "act"));
        assert!(matches!(
            prefixed.parse_path("/other/ns/act"),
            Err(RouteError::MalformedPath(_))
        ));
        assert!(matches!(
            prefixed.parse_path("/apidiscovery/discoverOpenUiFeatures"),
            Err(RouteError::MalformedPath(_))
        ));

        let slashed = router(Some("/api/"));
        assert_eq!(slashed.parse_path("/api/ns/act").unwrap(), ("ns", "act"));
    }

    #[test]
    fn parse_path_rejects_wrong_segment_counts() {
        let router = router(None);
        for path in ["", "/", "/ns", "/ns/act/extra", "/ns//act"] {
            assert!(
                matches!(router.parse_path(path), Err(RouteError::MalformedPath(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn no_match_is_an_ok_envelope_with_default_result() {
        let envelope = router(None)
            .handle_path("/ns/act", None, ())
            .await
            .unwrap();
        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.service_result, Snapshot::default());
    }

    #[test]
    fn request_deserializes_camel_case() {
        let request: ActivityRequest<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "namespace": "discovery",
            "activityName": "discoverOpenUiFeatures",
            "payload": {"q": 1}
        }))
        .unwrap();
        assert_eq!(request.activity_name, "discoverOpenUiFeatures");
        assert!(request.version.is_none());
    }
}
