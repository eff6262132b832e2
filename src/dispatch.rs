//! Response dispatch with per-handler failure isolation.
//!
//! Routes a terminal [`Outcome`] to the callbacks a caller registered in a
//! [`HandlerSet`]: the primary success or error handler, an exact-match
//! status-code handler, and a completion handler that always runs last.
//! Dispatch is best-effort fan-out - a misbehaving handler is contained at
//! the dispatch boundary and never prevents the remaining handlers from
//! running.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::outcome::Outcome;

/// Boxed callback invoked with the outcome of an exchange.
pub type Handler = Box<dyn Fn(&Outcome) + Send + Sync>;

/// Caller-supplied handlers for the outcome of one request.
///
/// Any subset of handlers may be absent; an absent slot is simply not
/// invoked. Built fluently:
///
/// ```
/// use circle_status::HandlerSet;
///
/// let handlers = HandlerSet::new()
///     .on_success(|outcome| println!("payload: {:?}", outcome.payload))
///     .on_error(|outcome| eprintln!("failed: {}", outcome.classification))
///     .on_status(404, |_| eprintln!("project not found"))
///     .on_complete(|_| println!("request finished"));
/// ```
#[derive(Default)]
pub struct HandlerSet {
    on_success: Option<Handler>,
    on_error: Option<Handler>,
    on_complete: Option<Handler>,
    by_status: HashMap<u16, Handler>,
}

impl HandlerSet {
    /// Creates an empty handler set. Dispatching to it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler invoked on success outcomes.
    #[must_use]
    pub fn on_success(mut self, handler: impl Fn(&Outcome) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Registers the handler invoked on error and transport-failure outcomes.
    #[must_use]
    pub fn on_error(mut self, handler: impl Fn(&Outcome) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Registers the handler invoked last, regardless of outcome.
    #[must_use]
    pub fn on_complete(mut self, handler: impl Fn(&Outcome) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Registers a handler for an exact HTTP status code.
    ///
    /// Fires in addition to the primary success/error handler when the
    /// outcome carries exactly this status code. No range or wildcard
    /// matching; re-registering a code replaces the previous handler.
    #[must_use]
    pub fn on_status(
        mut self,
        status_code: u16,
        handler: impl Fn(&Outcome) + Send + Sync + 'static,
    ) -> Self {
        self.by_status.insert(status_code, Box::new(handler));
        self
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("by_status", &self.by_status.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Routes an outcome to the registered handlers.
///
/// Invocation order:
/// 1. the primary handler - `on_success` for a success outcome, `on_error`
///    otherwise; an empty slot means no primary fires,
/// 2. the `by_status` handler whose key exactly equals the outcome's status
///    code, if both are present,
/// 3. `on_complete`, unconditionally.
///
/// All three invocation points receive the same `&Outcome`, so every handler
/// sees a consistent view of the exchange.
///
/// # Handler isolation
///
/// Each invocation is individually guarded: a handler that panics is caught
/// at the dispatch boundary and the panic is discarded. This is intentional
/// fire-and-forget isolation - dispatch itself never fails and never skips a
/// later handler because an earlier one misbehaved.
pub fn dispatch(outcome: &Outcome, handlers: &HandlerSet) {
    let primary =
        if outcome.is_success() { handlers.on_success.as_ref() } else { handlers.on_error.as_ref() };

    if let Some(handler) = primary {
        invoke_guarded(handler, outcome, "primary");
    }

    if let Some(status_code) = outcome.status_code {
        if let Some(handler) = handlers.by_status.get(&status_code) {
            invoke_guarded(handler, outcome, "by_status");
        }
    }

    if let Some(handler) = handlers.on_complete.as_ref() {
        invoke_guarded(handler, outcome, "on_complete");
    }
}

/// Invokes a single handler, containing any panic at the dispatch boundary.
fn invoke_guarded(handler: &Handler, outcome: &Outcome, slot: &str) {
    if catch_unwind(AssertUnwindSafe(|| handler(outcome))).is_err() {
        debug!(slot, classification = %outcome.classification, "handler panicked; continuing dispatch");
    }
}
