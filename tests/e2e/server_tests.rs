//! End-to-end tests against a server on a real socket

use runbox_tests::common::*;
use serde_json::{json, Value};
use std::time::Instant;

#[tokio::test]
async fn test_server_round_trip() {
    setup_test_logging();
    let server = TestServer::start(test_state()).await.unwrap();
    let client = reqwest::Client::new();

    let health: Value = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({ "status": "ok" }));

    let response = client
        .post(server.url("/execute"))
        .json(&json!({ "code": "echo 'from the sandbox'" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["output"], "from the sandbox");

    let response = client
        .post(server.url("/execute"))
        .json(&json!({ "code": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let server = TestServer::start(test_state()).await.unwrap();
    let client = reqwest::Client::new();

    let slow = {
        let client = client.clone();
        let url = server.url("/execute");
        tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "code": "sleep 5", "timeout": 300 }))
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        })
    };

    let started = Instant::now();
    let mut fast = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        let url = server.url("/execute");
        fast.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "code": format!("echo {}", i) }))
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        }));
    }

    for (i, handle) in fast.into_iter().enumerate() {
        let body = handle.await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["output"], i.to_string());
    }

    let body = slow.await.unwrap();
    assert_eq!(body["error"], "Timeout exceeded 300ms");
    assert!(started.elapsed().as_secs() < 5);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_graceful_shutdown_releases_the_port() {
    let server = TestServer::start(test_state()).await.unwrap();
    let addr = server.addr;
    server.stop().await.unwrap();

    let result = reqwest::Client::new()
        .get(format!("http://{}/health", addr))
        .send()
        .await;
    assert!(result.is_err());
}
