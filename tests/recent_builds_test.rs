//! End-to-end tests for the recent-builds query pipeline.
//!
//! Exercises the full path from HTTP exchange through workflow filtering to
//! handler dispatch against a mock CircleCI API.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use circle_status::{
    ApiClient, CredentialStore, Credentials, HandlerSet, Outcome, Project, StaticCredentials,
    StatusClient,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use url::Url;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,circle_status=debug")),
        )
        .with_test_writer()
        .try_init();
}

fn test_client(mock_server: &MockServer) -> StatusClient {
    init_tracing();

    let api = ApiClient::with_defaults().expect("failed to build API client");
    let base_url = Url::parse(&format!("{}/api/v1.1", mock_server.uri())).unwrap();
    let credentials = StaticCredentials::new(Credentials::from_token("tok123"));

    StatusClient::with_parts(api, base_url, Box::new(credentials))
}

fn capture_payload(
    slot: &Arc<Mutex<Option<Value>>>,
) -> impl Fn(&Outcome) + Send + Sync + 'static {
    let slot = Arc::clone(slot);
    move |outcome| *slot.lock().unwrap() = outcome.payload.clone()
}

#[tokio::test]
async fn successful_query_dispatches_filtered_listing() {
    let mock_server = MockServer::start().await;

    let listing = json!([
        {"build_num": 12, "workflows": {"workflow_id": "w2"}},
        {"build_num": 11, "workflows": {"workflow_id": "w2"}},
        {"build_num": 10, "workflows": {"workflow_id": "w1"}},
    ]);

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/v1.1/project/github/acme/widget"))
        .and(matchers::query_param("limit", "16"))
        .and(matchers::query_param("shallow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let project = Project::new("github", "acme", "widget");

    let payload = Arc::new(Mutex::new(None));
    let handlers = HandlerSet::new().on_success(capture_payload(&payload));

    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(
        *payload.lock().unwrap(),
        Some(json!([
            {"build_num": 12, "workflows": {"workflow_id": "w2"}},
            {"build_num": 11, "workflows": {"workflow_id": "w2"}},
        ]))
    );
}

#[tokio::test]
async fn query_sends_basic_authorization_header() {
    let mock_server = MockServer::start().await;

    // base64("tok123:")
    Mock::given(matchers::method("GET"))
        .and(matchers::header("authorization", "Basic dG9rMTIzOg=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let project = Project::new("github", "acme", "widget");

    client.recent_builds(&project, HandlerSet::new()).await.expect("query should be issued");
}

#[tokio::test]
async fn branch_scoped_query_uses_tree_path() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/v1.1/project/github/acme/widget/tree/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let project = Project::new("github", "acme", "widget").branch("main");

    let payload = Arc::new(Mutex::new(None));
    let handlers = HandlerSet::new().on_success(capture_payload(&payload));

    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(*payload.lock().unwrap(), Some(json!([])));
}

#[tokio::test]
async fn error_response_routes_through_error_and_status_handlers() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Project not found"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let project = Project::new("github", "acme", "missing");

    let log = Arc::new(Mutex::new(Vec::new()));
    let record = |log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str| {
        let log = Arc::clone(log);
        move |_: &Outcome| log.lock().unwrap().push(label)
    };

    let handlers = HandlerSet::new()
        .on_success(record(&log, "success"))
        .on_error(record(&log, "error"))
        .on_status(404, record(&log, "404"))
        .on_complete(record(&log, "complete"));

    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(*log.lock().unwrap(), vec!["error", "404", "complete"]);
}

#[tokio::test]
async fn transport_failure_skips_status_handlers() {
    init_tracing();

    // Nothing listens on this port; the exchange never produces a response.
    let api = ApiClient::with_defaults().expect("failed to build API client");
    let base_url = Url::parse("http://127.0.0.1:9/api/v1.1").unwrap();
    let credentials = StaticCredentials::new(Credentials::from_token("tok123"));
    let client = StatusClient::with_parts(api, base_url, Box::new(credentials));

    let log = Arc::new(Mutex::new(Vec::new()));
    let record = |log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str| {
        let log = Arc::clone(log);
        move |outcome: &Outcome| {
            assert_eq!(outcome.status_code, None);
            log.lock().unwrap().push(label);
        }
    };

    let handlers = HandlerSet::new()
        .on_error(record(&log, "error"))
        .on_status(404, record(&log, "404"))
        .on_complete(record(&log, "complete"));

    let project = Project::new("github", "acme", "widget");
    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(*log.lock().unwrap(), vec!["error", "complete"]);
}

#[tokio::test]
async fn unauthenticated_query_omits_authorization() {
    struct NoCredentials;

    impl CredentialStore for NoCredentials {
        fn lookup(&self, _host: &str, _port: u16) -> Option<Credentials> {
            None
        }
    }

    init_tracing();

    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let api = ApiClient::with_defaults().expect("failed to build API client");
    let base_url = Url::parse(&format!("{}/api/v1.1", mock_server.uri())).unwrap();
    let client = StatusClient::with_parts(api, base_url, Box::new(NoCredentials));

    let seen = Arc::new(Mutex::new(None));
    let handlers = HandlerSet::new().on_success(capture_payload(&seen));

    let project = Project::new("github", "acme", "widget");
    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(*seen.lock().unwrap(), Some(json!([])));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn panicking_handler_does_not_poison_the_query() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"build_num": 1, "workflows": {"workflow_id": "w1"}}])),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let project = Project::new("github", "acme", "widget");

    let completions = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&completions);

    let handlers = HandlerSet::new()
        .on_success(|_| panic!("handler bug"))
        .on_complete(move |_| *counter.lock().unwrap() += 1);

    client.recent_builds(&project, handlers).await.expect("query should be issued");

    assert_eq!(*completions.lock().unwrap(), 1);
}
