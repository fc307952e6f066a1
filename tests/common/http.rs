use anyhow::Result;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use dbag::collection::MetricManager;
use dbag::http::server::build_router;
use dbag::http::state::HttpServerState;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`
use tower_http::timeout::TimeoutLayer;

/// Sends requests straight to the router, without binding a socket.
pub struct TestApp {
    app: axum::Router,
}

impl TestApp {
    pub fn new(manager: MetricManager) -> Self {
        let state = HttpServerState {
            name: Arc::new("dbag test".to_string()),
            manager: Arc::new(manager),
        };
        Self {
            app: build_router(state),
        }
    }

    /// Same routes behind a request timeout, like the served router.
    pub fn with_request_timeout(manager: MetricManager, timeout: Duration) -> Self {
        let mut test_app = Self::new(manager);
        test_app.app = test_app.app.layer(TimeoutLayer::new(timeout));
        test_app
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder().uri(path).body(Body::empty())?;
        let response = self.app.clone().oneshot(request).await?;
        TestResponse::new(response).await
    }

    pub async fn post(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::empty())?;
        let response = self.app.clone().oneshot(request).await?;
        TestResponse::new(response).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Result<Self> {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(Self {
            status,
            body: String::from_utf8(bytes.to_vec())?,
        })
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}. Body: {}",
            expected, self.status, self.body
        );
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
