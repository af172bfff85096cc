use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::LazyLock;
use std::time::Instant;
use trai_derive::{api_handler, api_model};
use trai_domain::constants::SYSTEM_TAG;

#[api_model]
/// Liveness report.
pub struct HealthResponse {
    /// Always `up` while the process serves requests.
    pub status: String,
    pub version: String,
    /// Seconds since the first health request or server start.
    pub uptime: u64,
}

#[api_model]
pub struct WelcomeResponse {
    pub message: String,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Pins the uptime origin; called once at start-up.
pub(crate) fn mark_started() {
    LazyLock::force(&START_TIME);
}

#[api_handler(
    get,
    path = "/",
    responses((status = OK, description = "Greeting", body = WelcomeResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: "Welcome to TrAi!".to_owned() })
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
