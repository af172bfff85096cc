#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use trai_kernel::server::router::system_router;

async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let (router, _) = system_router::<()>().split_for_parts();
    let response =
        router.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_welcomes() {
    let (status, _, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to TrAi!");
}

#[tokio::test]
async fn health_is_up_and_not_cached() {
    let (status, headers, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime"].is_u64());
    assert!(headers[header::CACHE_CONTROL].to_str().unwrap().contains("no-store"));
}
