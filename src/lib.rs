//! CircleCI build-status client with handler-based response dispatch.
//!
//! This crate queries CircleCI's v1.1 REST API for recent build status and
//! routes the result of each exchange to caller-supplied handlers. The heart
//! of the crate is the response dispatch pipeline: every HTTP exchange ends
//! in an [`Outcome`], a success outcome has its payload reshaped by a query
//! transform, and the outcome is then fanned out to the handlers the caller
//! registered for it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────────┐
//! │ StatusClient │──▶│ FilteringExecutor  │──▶│ ResponseDispatch │
//! └──────────────┘   └────────────────────┘   └──────────────────┘
//!        │                    │                        │
//!        ▼                    ▼                        ▼
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────────┐
//! │ HTTP         │   │ workflow filter    │   │ caller           │
//! │ transport    │   │ (success only)     │   │ HandlerSet       │
//! └──────────────┘   └────────────────────┘   └──────────────────┘
//! ```
//!
//! # Key behaviors
//!
//! - **Classification routing** - `on_success` or `on_error` fires based on
//!   the outcome, an exact status-code handler may fire alongside, and
//!   `on_complete` always fires last.
//! - **Handler isolation** - a panicking handler never prevents the remaining
//!   handlers from running; dispatch itself never fails.
//! - **Workflow deduplication** - the recent-builds query keeps only the
//!   builds belonging to the most recent workflow, so callers see one logical
//!   unit of work instead of interleaved retries and fan-out jobs.
//!
//! # Example
//!
//! ```no_run
//! use circle_status::{Config, HandlerSet, Project, StatusClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = StatusClient::new(Config::load()?)?;
//! let project = Project::new("github", "acme", "widget").branch("main");
//!
//! let handlers = HandlerSet::new()
//!     .on_success(|outcome| println!("builds: {:?}", outcome.payload))
//!     .on_status(401, |_| eprintln!("check CIRCLE_TOKEN"))
//!     .on_complete(|_| println!("done"));
//!
//! client.recent_builds(&project, handlers).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod url;
pub mod workflow;

// Re-export main public API
pub use auth::{CredentialStore, Credentials, EnvCredentials, StaticCredentials};
pub use client::{ApiClient, ClientConfig};
pub use config::Config;
pub use dispatch::{dispatch, HandlerSet};
pub use error::{Result, StatusError};
pub use executor::{execute, execute_unfiltered};
pub use outcome::{Classification, Outcome};
pub use workflow::{keep_latest_workflow, Project, StatusClient};

/// Maximum number of build records requested per recent-builds listing.
pub const RECENT_BUILDS_LIMIT: usize = 16;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default CircleCI API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://circleci.com/api/v1.1";
