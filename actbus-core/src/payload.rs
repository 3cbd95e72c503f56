//! Payload trait for values threaded through a dispatch call.

/// A marker trait for payloads carried through the handler chain.
///
/// Each handler receives its own clone of the current payload, so payloads
/// must be `Clone`. They must also be `Send + Sync + 'static` to cross tasks.
///
/// Any type meeting those bounds is a payload; pick a concrete schema per
/// namespace, or `serde_json::Value` for loosely-typed surfaces.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct DiscoverRequest { locale: String }
///
/// let bus: Bus<DiscoverRequest> = Bus::new(registry);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Payload",
    label = "must be `Clone + Send + Sync + 'static`",
    note = "Payloads are cloned for every handler and may cross task boundaries."
)]
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}
