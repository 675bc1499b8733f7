use super::TestApp;
use axum::http::StatusCode;

#[tokio::test]
async fn flow_endpoints_are_rate_limited_per_client() {
    let app = TestApp::with(|state| {
        state.rate_limit_rps = 1;
        state.rate_limit_burst = 0;
    });

    let (first, _) = app.post("/api/tx/rebalance", "", None).await;
    assert_eq!(first, StatusCode::OK);
    let (second, body) = app.post("/api/tx/rebalance", "", None).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn reads_are_not_rate_limited() {
    let app = TestApp::with(|state| {
        state.rate_limit_rps = 1;
        state.rate_limit_burst = 0;
    });
    for _ in 0..3 {
        let (status, _, _) = app.get("/api/balances").await;
        assert_eq!(status, StatusCode::OK);
    }
}
