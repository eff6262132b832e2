//! Terminal outcome of a single HTTP exchange.
//!
//! An [`Outcome`] is the transport layer's final word on one request: how it
//! classified the result, the status code if a response was received, the
//! decoded payload on success, and an open mapping of contextual values that
//! are forwarded opaquely to handlers.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Classification of how an HTTP exchange terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Response received with a success status; payload decoded.
    Success,
    /// Response received with a non-success status, or the success body
    /// could not be decoded.
    HttpError,
    /// No response was received (connection failure, timeout).
    TransportFailure,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::HttpError => write!(f, "http_error"),
            Self::TransportFailure => write!(f, "transport_failure"),
        }
    }
}

/// Terminal result of one HTTP exchange.
///
/// Constructed once per request by the transport layer and dropped after
/// dispatch completes. Handlers receive a shared reference, so every handler
/// registered for a request sees the same view of the outcome.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// How the exchange terminated.
    pub classification: Classification,
    /// HTTP status code; present only if a response was received.
    pub status_code: Option<u16>,
    /// Decoded response payload; present only on success.
    pub payload: Option<Value>,
    /// Auxiliary values supplied by the transport layer, forwarded opaquely
    /// to handlers (final URL, selected response headers).
    pub context: HashMap<String, Value>,
}

impl Outcome {
    /// Creates a success outcome with a decoded payload.
    pub fn success(status_code: u16, payload: Value) -> Self {
        Self {
            classification: Classification::Success,
            status_code: Some(status_code),
            payload: Some(payload),
            context: HashMap::new(),
        }
    }

    /// Creates an error outcome for a response with a non-success status.
    pub fn http_error(status_code: u16) -> Self {
        Self {
            classification: Classification::HttpError,
            status_code: Some(status_code),
            payload: None,
            context: HashMap::new(),
        }
    }

    /// Creates an outcome for an exchange that produced no response.
    pub fn transport_failure() -> Self {
        Self {
            classification: Classification::TransportFailure,
            status_code: None,
            payload: None,
            context: HashMap::new(),
        }
    }

    /// Attaches a contextual value for handlers to inspect.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Returns whether this outcome is classified as a success.
    pub fn is_success(&self) -> bool {
        self.classification == Classification::Success
    }
}
