//! Router-level tests for the execution API
//!
//! Requests go through the full axum stack, CORS and tracing layers
//! included, with `/bin/sh -s` standing in for the interpreter.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use runbox_server::create_router;
use runbox_tests::common::*;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_endpoint() {
    setup_test_logging();
    let response = create_router(test_state())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_execute_success() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"echo hello; echo"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["output"], "hello");
    assert!(body.get("error").is_none());
    assert!(body["executionTimeMs"].is_u64());
}

#[tokio::test]
async fn test_missing_and_empty_code() {
    for payload in [r#"{}"#, r#"{"code":""}"#, r#"{"timeout":100}"#, r#"{"code":null}"#] {
        let response = create_router(test_state())
            .oneshot(execute_request(payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "Missing code", "executionTimeMs": 0 })
        );
    }
}

#[tokio::test]
async fn test_malformed_body() {
    for payload in ["not json", r#"{"code":42}"#, r#"{"code":"echo","timeout":"fast"}"#, "[]"] {
        let response = create_router(test_state())
            .oneshot(execute_request(payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["executionTimeMs"], 0);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Invalid request body: "), "{}", error);
    }
}

#[tokio::test]
async fn test_blocked_import_is_rejected_with_ok_status() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"import os\nprint(os.getcwd())"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "error": "Blocked import: os", "executionTimeMs": 0 })
    );
}

#[tokio::test]
async fn test_dangerous_call_is_rejected() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"x = eval ('1+1')"}"#))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Blocked: eval/exec/compile");
}

#[tokio::test]
async fn test_non_whitelisted_import() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"import numpy as np"}"#))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Import not whitelisted: numpy");
}

#[tokio::test]
async fn test_failure_reports_stderr() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"echo broken >&2; exit 3"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "broken");
}

#[tokio::test]
async fn test_failure_without_stderr_reports_exit_code() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"exit 7"}"#))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["error"], "Exit code 7");
}

#[tokio::test]
async fn test_timeout_names_the_limit() {
    let response = create_router(test_state())
        .oneshot(execute_request(r#"{"code":"sleep 5","timeout":200}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Timeout exceeded 200ms");
    let elapsed = body["executionTimeMs"].as_u64().unwrap();
    assert!(elapsed >= 200, "elapsed {}", elapsed);
    assert!(elapsed < 2000, "elapsed {}", elapsed);
}

#[tokio::test]
async fn test_zero_timeout_falls_back_to_default() {
    let mut config = shell_config();
    config.limits.default_timeout = Duration::from_millis(300);

    let response = create_router(test_state_with(config))
        .oneshot(execute_request(r#"{"code":"sleep 5","timeout":0}"#))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["error"], "Timeout exceeded 300ms");
}

#[tokio::test]
async fn test_timeout_clamped_to_ceiling() {
    let mut config = shell_config();
    config.limits.default_timeout = Duration::from_millis(200);
    config.limits.max_timeout = Some(Duration::from_millis(250));

    let response = create_router(test_state_with(config))
        .oneshot(execute_request(r#"{"code":"sleep 5","timeout":60000}"#))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["error"], "Timeout exceeded 250ms");
}

#[tokio::test]
async fn test_cors_headers_on_every_response() {
    let requests = vec![
        Request::get("/health").body(Body::empty()).unwrap(),
        execute_request("{}"),
        Request::get("/unknown").body(Body::empty()).unwrap(),
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/execute")
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let response = create_router(test_state()).oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET,POST,OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }
}

#[tokio::test]
async fn test_preflight_returns_no_content() {
    let response = create_router(test_state())
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/anything/at/all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = create_router(test_state())
        .oneshot(Request::post("/run").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({ "error": "Not found" }));
}
