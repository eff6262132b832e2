//! Configuration for embedding applications.
//!
//! Loaded in priority order: environment variables, then
//! `circle-status.toml`, then built-in defaults. The client works
//! out-of-the-box against circleci.com; set `CIRCLE_TOKEN` for private
//! projects.

use std::time::Duration;

use anyhow::Context;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::ClientConfig;

const CONFIG_FILE: &str = "circle-status.toml";

/// Client configuration with defaults, file, and environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the CircleCI API.
    ///
    /// Environment variable: `CIRCLE_API_BASE_URL`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `CIRCLE_REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// User agent string for requests.
    ///
    /// Environment variable: `CIRCLE_USER_AGENT`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to verify TLS certificates.
    ///
    /// Environment variable: `CIRCLE_VERIFY_TLS`
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// API token; when set, requests carry basic authorization.
    ///
    /// Environment variable: `CIRCLE_TOKEN`
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Loads configuration from defaults, `circle-status.toml`, and
    /// `CIRCLE_`-prefixed environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails to parse or the merged
    /// configuration is invalid.
    pub fn load() -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("CIRCLE_"));

        let config: Self = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Converts to the transport client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout),
            user_agent: self.user_agent.clone(),
            verify_tls: self.verify_tls,
            ..ClientConfig::default()
        }
    }

    /// Validates configuration values.
    fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url: {}", self.api_base_url))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            verify_tls: default_verify_tls(),
            token: None,
        }
    }
}

fn default_api_base_url() -> String {
    crate::DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    crate::DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
    concat!("circle-status/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_verify_tls() -> bool {
    true
}
