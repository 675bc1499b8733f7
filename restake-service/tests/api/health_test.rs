use super::{tokens, TestApp, SIGNER};
use axum::body::Body;
use axum::http::{Request, StatusCode};

#[tokio::test]
async fn health_is_always_up() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}

#[tokio::test]
async fn ready_reflects_chain_reachability() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(body["status"], "ready");

    app.chain.fail_reads("eth_blockNumber");
    let (status, _, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("degraded"));
}

#[tokio::test]
async fn metrics_count_flows_and_transactions() {
    let app = TestApp::new();
    app.chain.set_native_balance(SIGNER, tokens(1));
    let (status, _) = app.post("/api/tx/magma/stake", r#"{"amount":"1"}"#, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, text) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"].to_str().expect("content type").starts_with("text/plain"));
    assert!(text.contains(r#"flow_requests_total{flow="stake",status="ok"} 1"#));
    assert!(text.contains(r#"transactions_total{kind="magma.depositMon",status="confirmed"} 1"#));
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").header("x-request-id", "req-42").body(Body::empty()).expect("request");
    let (_, headers, _) = app.send(request).await;
    assert_eq!(headers["x-request-id"], "req-42");

    let (_, headers, _) = app.get("/health").await;
    assert!(!headers["x-request-id"].is_empty());
}
