//! Error types for status client operations.
//!
//! Errors here cover failures that occur before any HTTP exchange takes
//! place: bad configuration, unbuildable clients, malformed URLs, missing
//! credentials. Once an exchange has been issued, its result is never an
//! error from the caller's perspective - it arrives as an [`Outcome`] and is
//! routed through the registered handlers instead.
//!
//! [`Outcome`]: crate::outcome::Outcome

use thiserror::Error;

/// Result type alias for status client operations.
pub type Result<T> = std::result::Result<T, StatusError>;

/// Error types for status client setup and request construction.
#[derive(Debug, Clone, Error)]
pub enum StatusError {
    /// Invalid client or service configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// A request URL could not be constructed.
    #[error("invalid request URL: {message}")]
    InvalidUrl {
        /// URL construction error message
        message: String,
    },
}

impl StatusError {
    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates an invalid URL error from a message.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl { message: message.into() }
    }
}

impl From<url::ParseError> for StatusError {
    fn from(err: url::ParseError) -> Self {
        Self::invalid_url(err.to_string())
    }
}
