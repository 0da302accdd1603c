mod common;

use axum::extract::State;
use store_rating_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check(State(common::lazy_state())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "OK");
    assert_eq!(data.environment, "development");
    assert_eq!(data.version, env!("CARGO_PKG_VERSION"));
}
