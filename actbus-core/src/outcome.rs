//! Handler output conversion.

use crate::error::BoxError;

/// What a handler invocation produced: an optional payload rewrite, or a failure.
pub type Outcome<P> = Result<Option<P>, BoxError>;

/// Shorthand return type for fallible handlers.
pub type HandlerResult<T = ()> = Result<T, BoxError>;

/// Wraps a payload returned from a handler as a rewrite.
///
/// Returning `Updated(p)` is equivalent to calling
/// [`Accumulator::set_updated_payload`](crate::Accumulator::set_updated_payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated<P>(pub P);

/// Trait for converting a handler's output into an [`Outcome`].
///
/// # Default Implementations
///
/// - `()` → no rewrite
/// - `Option<P>` → rewrite when `Some`
/// - `Updated<P>` → rewrite
/// - `Result<T, E>` → delegates to inner `T` or reports the failure
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoOutcome<{P}>`",
    label = "missing `IntoOutcome` implementation",
    note = "Handlers may return `()`, `Option<P>`, `Updated<P>`, or a `Result` of those."
)]
pub trait IntoOutcome<P> {
    /// Convert the output into an optional rewrite or a failure.
    fn into_outcome(self) -> Outcome<P>;
}

impl<P> IntoOutcome<P> for () {
    fn into_outcome(self) -> Outcome<P> {
        Ok(None)
    }
}

impl<P> IntoOutcome<P> for Option<P> {
    fn into_outcome(self) -> Outcome<P> {
        Ok(self)
    }
}

impl<P> IntoOutcome<P> for Updated<P> {
    fn into_outcome(self) -> Outcome<P> {
        Ok(Some(self.0))
    }
}

impl<P, T, E> IntoOutcome<P> for Result<T, E>
where
    T: IntoOutcome<P>,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Outcome<P> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}
