mod common;

use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

fn server() -> TestServer {
    let (app, _state) = common::test_app();
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn health_is_ok() {
    let server = server();
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn start_run_returns_prefixed_id() {
    let server = server();
    let resp = server.post("/api/v1/runs").await;
    resp.assert_status_ok();

    let run_id = resp.json::<Value>()["run_id"].as_str().unwrap().to_string();
    assert!(run_id.starts_with("run_"));

    // Identifiers are opaque and never reused.
    let other = server.post("/api/v1/runs").await.json::<Value>()["run_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(run_id, other);
}

#[tokio::test]
async fn score_report_accumulates() {
    let server = server();

    let resp = server
        .post("/api/v1/score")
        .json(&json!({ "name": "Alice", "distance": 95.0 }))
        .await;
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    assert_eq!(body["xp"], 9);
    assert_eq!(body["distance"], 95.0);

    let resp = server
        .post("/api/v1/score")
        .json(&json!({ "name": "Alice", "distance": 10.0 }))
        .await;
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    assert_eq!(body["xp"], 10);
    assert_eq!(body["distance"], 105.0);
}

#[tokio::test]
async fn score_report_validates_input() {
    let server = server();

    let resp = server
        .post("/api/v1/score")
        .json(&json!({ "name": "   ", "distance": 10.0 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/v1/score")
        .json(&json!({ "name": "Alice", "distance": -5.0 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scoreboard_ranks_and_limits() {
    let server = server();
    for (name, distance) in [("Alice", 100.0), ("Bob", 300.0), ("Carol", 200.0)] {
        server
            .post("/api/v1/score")
            .json(&json!({ "name": name, "distance": distance }))
            .await
            .assert_status_ok();
    }

    let resp = server.get("/api/v1/scoreboard").await;
    resp.assert_status_ok();
    let rows = resp.json::<Value>()["data"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(rows[1]["name"], "Carol");
    assert_eq!(rows[2]["name"], "Alice");

    let resp = server.get("/api/v1/scoreboard?limit=2").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn scoreboard_is_empty_before_any_report() {
    let server = server();
    let resp = server.get("/api/v1/scoreboard").await;
    resp.assert_status_ok();
    assert!(resp.json::<Value>()["data"].as_array().unwrap().is_empty());
}
