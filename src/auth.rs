//! Credential resolution and authorization header construction.
//!
//! CircleCI's v1.1 API authenticates with an API token passed as the basic
//! auth username and an empty password, so the header value is
//! `Basic <base64(secret + ":")>`. Credential lookup is behind the
//! [`CredentialStore`] trait so embedding applications can plug in their own
//! secret storage.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A username/secret pair for one API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account or token owner name.
    pub user: String,
    /// API token used to authenticate requests.
    pub secret: String,
}

impl Credentials {
    /// Creates credentials from a user and secret.
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { user: user.into(), secret: secret.into() }
    }

    /// Creates credentials from a bare API token.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self { user: token.clone(), secret: token }
    }

    /// Formats the `Authorization` header value for this credential.
    ///
    /// The token is the basic auth username with an empty password:
    /// `Basic <base64(secret + ":")>`.
    pub fn basic_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.secret)))
    }
}

/// Source of credentials for a given host and port.
pub trait CredentialStore: Send + Sync {
    /// Looks up credentials for the given host/port, if any are known.
    fn lookup(&self, host: &str, port: u16) -> Option<Credentials>;
}

/// Credential store backed by the `CIRCLE_TOKEN` environment variable.
///
/// Ignores host and port; yields nothing when the variable is unset or
/// empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

/// Environment variable consulted by [`EnvCredentials`].
pub const TOKEN_ENV_VAR: &str = "CIRCLE_TOKEN";

impl CredentialStore for EnvCredentials {
    fn lookup(&self, _host: &str, _port: u16) -> Option<Credentials> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.is_empty() => Some(Credentials::from_token(token)),
            _ => None,
        }
    }
}

/// Credential store holding a single fixed credential.
///
/// Used when the token comes from configuration, and in tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Creates a store that always yields the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialStore for StaticCredentials {
    fn lookup(&self, _host: &str, _port: u16) -> Option<Credentials> {
        Some(self.credentials.clone())
    }
}
