//! HTTP transport for status queries with configurable timeouts.
//!
//! Issues a single GET per call and condenses whatever happened - response,
//! connection failure, timeout, undecodable body - into an [`Outcome`] for
//! the dispatch pipeline. The transport never returns an error for a failed
//! exchange; failures are classified and routed through handlers like any
//! other terminal state.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

use crate::error::{Result, StatusError};
use crate::outcome::Outcome;

/// Maximum number of error-body bytes attached to an outcome's context.
const MAX_CONTEXT_BODY_SIZE: usize = 1024;

/// Configuration for the status API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for HTTP requests.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    pub max_redirects: u32,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("circle-status/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 3,
            verify_tls: true,
        }
    }
}

/// HTTP client for CircleCI API queries.
///
/// Uses connection pooling and configurable timeouts; cheap to clone. One
/// call to [`ApiClient::get`] performs one exchange and yields exactly one
/// [`Outcome`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a new API client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| StatusError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a new API client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Performs a GET request and classifies its terminal state.
    ///
    /// Classification:
    /// - 2xx with a decodable JSON body yields a success outcome carrying the
    ///   decoded payload,
    /// - any other response yields an HTTP-error outcome with its status code
    ///   and a truncated body excerpt in the context (a 2xx body that fails
    ///   to decode lands here as well, with a `decode_error` context entry),
    /// - no response at all yields a transport-failure outcome.
    ///
    /// The final request URL is attached to the context of every outcome.
    pub async fn get(&self, url: Url, authorization: Option<String>) -> Outcome {
        let span = info_span!("status_request", url = %url);

        async move {
            debug!("issuing status request");

            let mut request = self.client.get(url.clone()).header("accept", "application/json");
            if let Some(value) = authorization {
                request = request.header("authorization", value);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("request failed: {}", e);

                    let mut outcome = Outcome::transport_failure()
                        .with_context("url", json!(url.as_str()))
                        .with_context("error", json!(e.to_string()));
                    if e.is_timeout() {
                        outcome = outcome
                            .with_context("timeout_seconds", json!(self.config.timeout.as_secs()));
                    }
                    return outcome;
                },
            };

            let status_code = response.status().as_u16();
            let is_success = response.status().is_success();
            let final_url = response.url().as_str().to_string();

            debug!(status = status_code, "received response");

            let body = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(status = status_code, "failed to read response body: {}", e);
                    return Outcome::http_error(status_code)
                        .with_context("url", json!(final_url))
                        .with_context("error", json!(e.to_string()));
                },
            };

            if !is_success {
                warn!(status = status_code, "non-success response");
                return Outcome::http_error(status_code)
                    .with_context("url", json!(final_url))
                    .with_context("body", json!(truncate_body(&body)));
            }

            match serde_json::from_slice::<Value>(&body) {
                Ok(payload) => {
                    Outcome::success(status_code, payload).with_context("url", json!(final_url))
                },
                Err(e) => {
                    warn!(status = status_code, "failed to decode response body: {}", e);
                    Outcome::http_error(status_code)
                        .with_context("url", json!(final_url))
                        .with_context("decode_error", json!(e.to_string()))
                },
            }
        }
        .instrument(span)
        .await
    }
}

/// Renders a bounded excerpt of a response body for outcome context.
fn truncate_body(body: &[u8]) -> String {
    if body.len() > MAX_CONTEXT_BODY_SIZE {
        let suffix = "... (truncated)";
        let excerpt = String::from_utf8_lossy(&body[..MAX_CONTEXT_BODY_SIZE - suffix.len()]);
        format!("{excerpt}{suffix}")
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}
