use super::{tokens, TestApp, SIGNER};
use axum::body::Body;
use axum::http::{Request, StatusCode};

fn guarded() -> TestApp {
    TestApp::with(|state| state.api_token = Some("secret-token".to_string()))
}

#[tokio::test]
async fn flow_endpoints_require_token_when_configured() {
    let app = guarded();
    app.chain.set_native_balance(SIGNER, tokens(1));

    let (status, body) = app.post("/api/tx/magma/stake", r#"{"amount":"1"}"#, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unauthorized");
    assert!(app.chain.submitted().is_empty());

    let (status, body) = app.post("/api/tx/magma/stake", r#"{"amount":"1"}"#, Some("secret-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn api_key_header_is_accepted() {
    let app = guarded();
    let request = Request::builder().uri("/api/balances").header("x-api-key", "secret-token").body(Body::empty()).expect("request");
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn probes_and_streams_follow_the_token_rules() {
    let app = guarded();
    let (status, _, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = app.get("/api/logs/stream?id=op-1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
