use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trai_ai::*;
use trai_domain::enums::ProgressMetric;

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    body: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    mock.seen.lock().unwrap().push((auth, request));
    (mock.status, Json(mock.body.clone()))
}

fn reply(content: &str) -> Value {
    json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }] })
}

async fn serve(status: StatusCode, body: Value) -> (AiClient, Mock) {
    let mock = Mock { status, body, seen: Arc::default() };
    let app = Router::new().route("/v1/chat/completions", post(completions)).with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = AiClient::new(AiSettings {
        api_key: "gsk_test".into(),
        base_url: format!("http://{addr}/v1/"),
        model: "llama-test".into(),
        temperature: 0.7,
        max_tokens: 500,
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    (client, mock)
}

fn profile() -> CoachProfile {
    CoachProfile {
        name: "Alex".into(),
        level: Some("beginner".into()),
        goal: Some("weight_loss".into()),
        workouts_per_week: Some(3),
        ..CoachProfile::default()
    }
}

#[tokio::test]
async fn complete_sends_bearer_and_chat_body() {
    let (client, mock) = serve(StatusCode::OK, reply("Hello")).await;

    let text = client.complete("Say hello").await.unwrap();
    assert_eq!(text, "Hello");

    let seen = mock.seen.lock().unwrap();
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer gsk_test"));
    assert_eq!(body["model"], "llama-test");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Say hello");
    assert_eq!(body["max_tokens"], 500);
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn non_200_maps_to_status_error_with_provider_message() {
    let body = json!({ "error": { "message": "Invalid API Key", "type": "invalid_request_error" } });
    let (client, _) = serve(StatusCode::UNAUTHORIZED, body).await;

    match client.complete("x").await {
        Err(AiError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API Key");
        },
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_choices_is_invalid_response() {
    let (client, _) = serve(StatusCode::OK, json!({ "choices": [] })).await;
    assert!(matches!(client.complete("x").await, Err(AiError::InvalidResponse { .. })));
}

#[tokio::test]
async fn profile_tips_are_parsed_from_numbered_list() {
    let (client, _) =
        serve(StatusCode::OK, reply("1. Drink water\n2. Sleep 8 hours\n3. Walk daily")).await;

    let tips = client.profile_tips(&profile()).await.unwrap();
    assert_eq!(tips, vec!["Drink water", "Sleep 8 hours", "Walk daily"]);
}

#[tokio::test]
async fn dish_analysis_extracts_embedded_json() {
    let content = "Sure! {\"calories\": 250, \"protein\": 12.5, \"fat\": 8, \"carbs\": 30}";
    let (client, mock) = serve(StatusCode::OK, reply(content)).await;

    let dish = client.analyze_dish("Borscht", 300.0).await.unwrap();
    assert!((dish.calories - 250.0).abs() < f64::EPSILON);
    assert!((dish.protein - 12.5).abs() < f64::EPSILON);

    let prompt = mock.seen.lock().unwrap()[0].1["messages"][0]["content"].clone();
    assert!(prompt.as_str().unwrap().contains("Borscht"));
}

#[tokio::test]
async fn generated_workout_fills_defaults() {
    let content = r#"{"name": "Push day", "exercises": [{"name": "Push-ups", "muscle_group": "chest"}]}"#;
    let (client, _) = serve(StatusCode::OK, reply(content)).await;

    let workout = client.generate_workout(&profile(), "upper_body_push", &[]).await.unwrap();
    assert_eq!(workout.name, "Push day");
    assert_eq!(workout.exercises[0].sets, 3);
    assert_eq!(workout.exercises[0].reps, 10);
}

#[tokio::test]
async fn greeting_strips_wrapping_quotes() {
    let (client, _) = serve(StatusCode::OK, reply("\"Great week, Alex!\"")).await;
    let text = client.greeting(&profile(), &DashboardSnapshot::default()).await.unwrap();
    assert_eq!(text, "Great week, Alex!");
}

#[tokio::test]
async fn empty_progress_series_skips_the_model() {
    let (client, mock) = serve(StatusCode::OK, reply("unused")).await;

    let text = client.progress_analysis(&[], ProgressMetric::Weight, &profile()).await.unwrap();
    assert_eq!(text, start_tracking_message("Alex"));
    assert!(mock.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_is_http_error() {
    let client = AiClient::new(AiSettings {
        api_key: "k".into(),
        base_url: "http://127.0.0.1:1".into(),
        model: "m".into(),
        temperature: 0.0,
        max_tokens: 10,
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    assert!(matches!(
        client.complete("x").await,
        Err(AiError::Http { .. } | AiError::Timeout { .. })
    ));
}
