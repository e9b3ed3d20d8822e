// HTTP tests for the web adapter.
//
// Drives the router in-process with tower's `oneshot`; no socket is bound.
// Run with: cargo test --features web --test web_api

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use topiclens::config::Config;
use topiclens::lookup::NoLookup;
use topiclens::pipeline::Pipeline;
use topiclens::topics::lda::LdaTrainer;
use topiclens::web::{build_router, AppState};

fn app() -> axum::Router {
    let pipeline = Pipeline::new(
        Config::default(),
        Arc::new(LdaTrainer::default()),
        Arc::new(NoLookup),
    );
    build_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "topiclens-test-boundary";

fn multipart(parts: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in parts {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::post("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ============================================================
// /health and /summary
// ============================================================

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn summary_describes_configuration() {
    let response = app()
        .oneshot(form("/summary", "numTopics=4&numWords=7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let text = body["results"].as_str().unwrap();
    assert!(text.contains('4'));
    assert!(text.contains('7'));
}

#[tokio::test]
async fn summary_rejects_non_positive_counts() {
    let response = app()
        .oneshot(form("/summary", "numTopics=0&numWords=7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_parameter");
}

// ============================================================
// /analyze input errors
// ============================================================

#[tokio::test]
async fn analyze_without_file_is_no_input() {
    let response = app()
        .oneshot(multipart(&[("numTopics", "3")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["kind"], "no_input");
}

#[tokio::test]
async fn analyze_rejects_zero_topics() {
    let response = app()
        .oneshot(multipart(&[("file", "PK"), ("numTopics", "0")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_topic_count");
}

#[tokio::test]
async fn analyze_rejects_unreadable_archive() {
    let response = app()
        .oneshot(multipart(&[("file", "definitely not a zip archive")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["kind"], "unreadable_archive");
}
