//! Common test utilities shared across integration and E2E tests

pub mod test_server;

pub use test_server::*;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use runbox_sandbox::{InterpreterConfig, SandboxConfig, SandboxService};
use runbox_server::AppState;
use std::time::Duration;

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Sandbox driving `/bin/sh -s`, so tests need no Python
pub fn shell_config() -> SandboxConfig {
    let mut config = SandboxConfig {
        interpreter: InterpreterConfig::new("/bin/sh", ["-s"]),
        ..SandboxConfig::default()
    };
    config.limits.grace_period = Duration::from_millis(500);
    config
}

pub fn test_state() -> AppState {
    test_state_with(shell_config())
}

pub fn test_state_with(config: SandboxConfig) -> AppState {
    let service = SandboxService::from_config(&config).expect("valid test config");
    AppState::new(service)
}

/// `POST /execute` with a raw body
pub fn execute_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/execute")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("valid request")
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
