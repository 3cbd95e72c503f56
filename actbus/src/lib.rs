//! # actbus - Pattern-Routed Activity Dispatch Bus
//!
//! `actbus` routes an inbound activity, addressed by a
//! `(namespace, activity name, version)` triple, to every registered handler
//! whose matchers accept it. Handlers run sequentially across three phases,
//! share one per-call [`Accumulator`], and may rewrite the payload seen by
//! the handlers after them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actbus::prelude::*;
//! use serde_json::{Value, json};
//!
//! let mut registry = Registry::<Value>::new();
//! registry
//!     .register(Phase::Before, Registration::new("*", "*", "*", LoggingHandler::new()))?
//!     .register(
//!         Phase::Main,
//!         Registration::new("math", "double", "*", |p: Value, acc: Accumulator<Value>| async move {
//!             acc.mark_success(json!({ "result": p["n"].as_i64().unwrap_or(0) * 2 }));
//!         }),
//!     )?;
//!
//! let bus = Bus::new(registry);
//! let result = bus.run_all_matches("math", "double", "1.0.0", json!({ "n": 21 })).await?;
//! assert_eq!(result.data_field("result"), Some(&json!(42)));
//! ```
//!
//! ## Configuration
//!
//! Bindings, router settings and logging can also come from TOML; see
//! [`config`].
//!
//! ## Crates
//!
//! - `actbus-core`: vocabulary shared with capability modules
//! - `actbus-std`: reusable handlers, the UI feature registry and test doubles
//! - `actbus`: registry, bus, router and configuration

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod bus;
pub mod config;
pub mod logging;
pub mod registry;
pub mod router;

pub use actbus_core::{
    Accumulator, BoxError, BusError, ConfigurationError, DynHandler, ErrorDescriptor, Handler,
    HandlerError, HandlerResult, IntoOutcome, Matcher, MatcherSpec, Outcome, Payload, Phase,
    Route, RouteError, Snapshot, Updated, WILDCARD,
};

pub use bus::Bus;
pub use config::{BindingConfig, BusConfig, Config, ConfigError, HandlerTable};
pub use logging::{LogFormat, LoggingConfig};
pub use registry::{IntoRegistration, Registration, RegistrationBuilder, Registry, SharedHandler};
pub use router::{ActivityRequest, ActivityRouter, Envelope, RouterConfig, Status};

/// Standard handler implementations.
pub mod handlers {
    #![allow(clippy::wildcard_imports)]
    pub use actbus_std::handlers::*;
}

/// UI feature registry and discovery handler.
pub mod features {
    pub use actbus_std::features::{
        DiscoveryHandler, FEATURES_KEY, FeatureDescriptor, FeatureRegistry, FeatureSink,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use actbus_std::testing::*;
}

/// Prelude module - common imports for actbus.
///
/// # Usage
///
/// ```rust,ignore
/// use actbus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Result
        Accumulator,
        // Errors
        BoxError,
        // Bus
        Bus,
        BusError,
        // Handlers
        Handler,
        HandlerResult,
        Matcher,
        Phase,
        Registration,
        Registry,
        Snapshot,
        Updated,
        handlers::LoggingHandler,
    };
}
