//! # actbus-std
//!
//! Standard implementations for the actbus activity dispatch bus.
//!
//! This crate provides:
//! - **Standard handlers**: Logging, Tracing, Conditional, Timeout (feature `timeout`)
//! - **UI feature registry**: [`features::FeatureRegistry`] and its discovery handler
//! - **Testing doubles**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use actbus_core;

// Modules
pub mod features;
pub mod handlers;
pub mod testing;
