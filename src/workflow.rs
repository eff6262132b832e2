//! Recent-builds query with workflow deduplication.
//!
//! CircleCI's build-list endpoint interleaves builds from multiple workflow
//! runs - retries, fan-out jobs, older pushes. Callers asking "is my latest
//! workflow green" care about one logical unit of work, so the query filters
//! the listing down to the builds of the most recent workflow before it
//! reaches any handler.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::{CredentialStore, Credentials, EnvCredentials, StaticCredentials};
use crate::client::ApiClient;
use crate::config::Config;
use crate::dispatch::HandlerSet;
use crate::error::Result;
use crate::executor::execute;
use crate::url::build_url;

/// Identifies a CircleCI project, optionally scoped to a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// VCS provider segment (`github`, `bitbucket`).
    pub vcs: String,
    /// Organization or user owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to scope the listing to; `None` lists all branches.
    pub branch: Option<String>,
}

impl Project {
    /// Creates a project reference for a VCS provider, owner, and repository.
    pub fn new(vcs: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self { vcs: vcs.into(), owner: owner.into(), repo: repo.into(), branch: None }
    }

    /// Scopes the project to a single branch.
    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Client for CircleCI build-status queries.
///
/// Owns the HTTP transport, the API base URL, and a credential source.
/// Completion of a query is observed only through the handlers passed to it;
/// the returned `Result` covers request construction alone.
pub struct StatusClient {
    api: ApiClient,
    base_url: Url,
    credentials: Box<dyn CredentialStore>,
}

impl StatusClient {
    /// Creates a status client from configuration.
    ///
    /// A configured token takes priority as the credential source; otherwise
    /// the `CIRCLE_TOKEN` environment variable is consulted per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the configured
    /// base URL does not parse.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.to_client_config())?;
        let base_url = Url::parse(&config.api_base_url)?;
        let credentials: Box<dyn CredentialStore> = match &config.token {
            Some(token) => Box::new(StaticCredentials::new(Credentials::from_token(token.as_str()))),
            None => Box::new(EnvCredentials),
        };

        Ok(Self { api, base_url, credentials })
    }

    /// Creates a status client from pre-built parts.
    pub fn with_parts(api: ApiClient, base_url: Url, credentials: Box<dyn CredentialStore>) -> Self {
        Self { api, base_url, credentials }
    }

    /// Queries the most recent builds for a project and dispatches the
    /// outcome to `handlers`.
    ///
    /// Requests up to [`RECENT_BUILDS_LIMIT`] builds as a shallow (summary)
    /// listing, scoped to the project's branch when one is set. On success
    /// the payload reaching handlers has already been filtered by
    /// [`keep_latest_workflow`]; error outcomes are dispatched with their
    /// payload absent and untransformed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request URL cannot be constructed; every
    /// outcome of an issued exchange is routed through `handlers`.
    ///
    /// [`RECENT_BUILDS_LIMIT`]: crate::RECENT_BUILDS_LIMIT
    pub async fn recent_builds(&self, project: &Project, handlers: HandlerSet) -> Result<()> {
        let limit = crate::RECENT_BUILDS_LIMIT.to_string();
        let mut segments: Vec<&str> =
            vec!["project", &project.vcs, &project.owner, &project.repo];
        if let Some(branch) = project.branch.as_deref() {
            segments.push("tree");
            segments.push(branch);
        }

        let url =
            build_url(&self.base_url, &segments, &[("limit", &limit), ("shallow", "true")])?;

        debug!(owner = %project.owner, repo = %project.repo, "querying recent builds");

        let authorization = self.authorization_for(&url);
        let outcome = self.api.get(url, authorization).await;
        execute(outcome, &handlers, Some(keep_latest_workflow));
        Ok(())
    }

    /// Resolves the authorization header value for a request URL, if the
    /// credential source knows the host.
    fn authorization_for(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        self.credentials.lookup(host, port).map(|credentials| credentials.basic_header())
    }
}

/// Filters a build listing down to the builds of the most recent workflow.
///
/// The listing is ordered newest-first by the API, so the first record
/// defines the current workflow: its `workflows.workflow_id` value is read
/// and only records with an exactly equal value are kept, in their original
/// order. An empty listing yields an empty listing. Records without a
/// workflow id compare equal to each other (absent matches absent), so a run
/// of id-less builds is kept together; no special casing beyond exact-match
/// filtering.
///
/// Non-array payloads pass through unchanged; the endpoint contract says
/// array, and this transform guarantees filtering only.
pub fn keep_latest_workflow(payload: Value) -> Value {
    let Value::Array(records) = payload else {
        return payload;
    };

    let Some(first) = records.first() else {
        return Value::Array(records);
    };

    let current = workflow_id(first).cloned();
    let kept = records
        .into_iter()
        .filter(|record| workflow_id(record) == current.as_ref())
        .collect();

    Value::Array(kept)
}

/// Reads the nested `workflows.workflow_id` field of a build record.
fn workflow_id(record: &Value) -> Option<&Value> {
    record.pointer("/workflows/workflow_id")
}
