use assert_cmd::Command;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use predicates::prelude::*;
use std::net::SocketAddr;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn run_probe(url: String) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("trai-probe").unwrap().args(["--url", &url, "--timeout", "2"]).assert()
    })
    .await
    .unwrap()
}

#[test]
fn help_lists_the_url_flag() {
    Command::cargo_bin("trai-probe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"));
}

#[tokio::test(flavor = "multi_thread")]
async fn healthy_server_exits_zero() {
    let addr = serve(Router::new().route("/health", get(|| async { r#"{"status":"up"}"# }))).await;
    run_probe(format!("http://{addr}/health")).await.success();
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_exits_one() {
    let addr =
        serve(Router::new().route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))).await;
    run_probe(format!("http://{addr}/health"))
        .await
        .code(1)
        .stderr(predicate::str::contains("HTTP 503"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_exits_one() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    run_probe(format!("http://{addr}/health")).await.code(1);
}
