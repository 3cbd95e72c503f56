//! # actbus-core
//!
//! Core types for the actbus activity dispatch bus.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! capability modules that only need to write handlers, without pulling in
//! the registry and bus from `actbus`.
//!
//! # Vocabulary
//!
//! ## Routing ([`Route`], [`Matcher`])
//!
//! A dispatch call is addressed by a `(namespace, activity name, version)`
//! triple. Registrations select triples with one [`Matcher`] per component:
//! exact strings (with `"*"` as the wildcard token), regular expressions, or
//! predicates.
//!
//! ## Execution ([`Phase`], [`Handler`])
//!
//! Registrations live in one of three [`Phase`]s, always visited in the order
//! `Before → Main → After`. Each registration carries an ordered sequence of
//! [`Handler`]s that run one at a time.
//!
//! ## Result ([`Accumulator`], [`Snapshot`])
//!
//! Every dispatch call owns one [`Accumulator`], shared by all of its
//! handlers. Handlers contribute data, report success, and may rewrite the
//! payload every later handler receives. The caller gets back a [`Snapshot`].
//!
//! # Error Types
//!
//! - [`BusError`] - Faults surfaced by a dispatch call
//! - [`RouteError`] - Malformed routing input
//! - [`ConfigurationError`] - Rejected registrations
//! - [`HandlerError`] - Handler failures, recorded on the accumulator

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod accumulator;
mod error;
mod handler;
mod matcher;
mod outcome;
mod payload;
mod phase;
mod route;

// Re-exports
pub use accumulator::{Accumulator, ErrorDescriptor, Snapshot};
pub use error::{BoxError, BusError, ConfigurationError, HandlerError, RouteError};
pub use handler::{DynHandler, Handler};
pub use matcher::{Matcher, MatcherSpec, MatcherValue, PredicateFn, WILDCARD};
pub use outcome::{HandlerResult, IntoOutcome, Outcome, Updated};
pub use payload::Payload;
pub use phase::Phase;
pub use route::Route;
