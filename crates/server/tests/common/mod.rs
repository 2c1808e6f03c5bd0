//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a real SQLite store in a temp directory and a mock source and
//! notifier, so the HTTP surface can be exercised without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use kanshi_core::{
    testing::{MockNotifier, MockSource},
    CategoryStore, CheckerConfig, Config, CreateShowRequest, DatabaseConfig, NotificationService,
    ReconcileEngine, SettingsService, ShowStore, SourceAdapter, SqliteShowStore, TrackedShow,
    UserSettings,
};
use kanshi_server::state::AppState;

/// Re-export fixtures for test convenience
pub use kanshi_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_show_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/shows", json!({
///         "title": "Frieren",
///         "url": fixtures::show_url("frieren")
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock source - configure probe, scan and search answers
    pub source: Arc<MockSource>,
    /// Mock notifier - inspect delivered payloads
    pub notifier: Arc<MockNotifier>,
    /// Store shared with the router, for seeding and assertions
    pub store: Arc<SqliteShowStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_checker(CheckerConfig {
            enabled: false,
            inter_show_delay_ms: 0,
            ..Default::default()
        })
        .await
    }

    /// Create a test fixture with a custom checker configuration.
    pub async fn with_checker(checker: CheckerConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let source = Arc::new(MockSource::new());
        let notifier = Arc::new(MockNotifier::new());

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            checker: checker.clone(),
            ..Default::default()
        };

        let store =
            Arc::new(SqliteShowStore::new(&db_path).expect("Failed to create show store"));
        let shows: Arc<dyn ShowStore> = store.clone();
        let categories: Arc<dyn CategoryStore> = store.clone();
        let source_dyn: Arc<dyn SourceAdapter> = source.clone();

        let engine = Arc::new(ReconcileEngine::new(
            checker,
            Arc::clone(&shows),
            Arc::clone(&source_dyn),
        ));
        let settings = Arc::new(SettingsService::new(
            UserSettings::from_config(&config.checker, &config.notifications),
            store.clone(),
        ));
        let notifications = Arc::new(NotificationService::new(
            Arc::clone(&settings),
            notifier.clone(),
        ));

        let state = Arc::new(AppState::new(
            config,
            shows,
            categories,
            source_dyn,
            engine,
            notifications,
            settings,
        ));

        let router = kanshi_server::api::create_router(state);

        Self {
            router,
            source,
            notifier,
            store,
            temp_dir,
        }
    }

    /// Insert a show directly into the store.
    pub fn seed_show(&self, slug: &str, current: u32, total: u32) -> TrackedShow {
        let title = slug.replace('-', " ");
        self.store
            .create(
                CreateShowRequest::new(title, fixtures::show_url(slug))
                    .with_progress(current, total),
            )
            .expect("Failed to seed show")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
