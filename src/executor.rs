//! Conditional payload transformation ahead of dispatch.
//!
//! Sits between the transport layer and [`dispatch`]: on a success outcome
//! the decoded payload is first passed through a caller-supplied transform,
//! on any other outcome the transform is skipped entirely. This keeps
//! query-specific response shaping (such as the workflow filter) away from
//! error bodies, which have a different and incompatible shape.

use serde_json::Value;

use crate::dispatch::{dispatch, HandlerSet};
use crate::outcome::Outcome;

/// Applies `transform` to a success payload, then dispatches the outcome.
///
/// - On a success outcome, `outcome.payload` is replaced with
///   `transform(payload)` before handlers run. Passing `None` leaves the
///   payload as-is (identity).
/// - On any non-success outcome the transform does not execute and the
///   outcome reaches handlers unchanged. The transform may therefore assume
///   a present payload.
///
/// # Panics
///
/// A panicking transform is NOT contained here, in deliberate contrast to
/// the per-handler isolation inside [`dispatch`]: a broken transform is a
/// caller programming error, not a runtime or network condition, and is
/// allowed to escape.
pub fn execute<F>(mut outcome: Outcome, handlers: &HandlerSet, transform: Option<F>)
where
    F: FnOnce(Value) -> Value,
{
    if outcome.is_success() {
        if let Some(transform) = transform {
            let payload = outcome.payload.take().unwrap_or(Value::Null);
            outcome.payload = Some(transform(payload));
        }
    }

    dispatch(&outcome, handlers);
}

/// Dispatches an outcome without any payload transformation.
pub fn execute_unfiltered(outcome: Outcome, handlers: &HandlerSet) {
    execute(outcome, handlers, None::<fn(Value) -> Value>);
}
