//! The routing triple.

use crate::error::RouteError;
use std::fmt;

/// A validated `(namespace, activity name, version)` triple.
///
/// Every component is non-empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    namespace: String,
    activity: String,
    version: String,
}

impl Route {
    /// Build a route, rejecting empty components.
    pub fn new(
        namespace: impl Into<String>,
        activity: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, RouteError> {
        let namespace = namespace.into();
        let activity = activity.into();
        let version = version.into();

        if namespace.trim().is_empty() {
            return Err(RouteError::MissingNamespace);
        }
        if activity.trim().is_empty() {
            return Err(RouteError::MissingActivity);
        }
        if version.trim().is_empty() {
            return Err(RouteError::MissingVersion);
        }

        Ok(Self {
            namespace,
            activity,
            version,
        })
    }

    /// The namespace component.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The activity name component.
    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// The version component.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.namespace, self.activity, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_components() {
        assert_eq!(
            Route::new("", "bar", "1.0.0"),
            Err(RouteError::MissingNamespace)
        );
        assert_eq!(
            Route::new("foo", "  ", "1.0.0"),
            Err(RouteError::MissingActivity)
        );
        assert_eq!(Route::new("foo", "bar", ""), Err(RouteError::MissingVersion));
    }

    #[test]
    fn displays_as_path() {
        let route = Route::new("discovery", "discoverOpenUiFeatures", "1.0.0").unwrap();
        assert_eq!(route.to_string(), "discovery/discoverOpenUiFeatures@1.0.0");
    }
}
