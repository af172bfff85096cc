use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use trai_domain::config::FoodConfig;
use trai_nutrition::FoodFactsClient;

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(params.get("json").map(String::as_str), Some("1"));
    let size: usize = params.get("page_size").and_then(|s| s.parse().ok()).unwrap_or(0);
    let products = vec![
        json!({"product_name": "Greek yogurt", "brands": "Farm", "code": "1",
               "nutriments": {"energy-kcal_100g": 97, "proteins_100g": 9, "fat_100g": 5, "carbohydrates_100g": 4}}),
        json!({"product_name": "Mystery", "code": "2", "nutriments": {}}),
        json!({"product_name": "Granola", "code": "3", "nutriments": {"energy_100g": 1900}}),
    ];
    Json(json!({"count": products.len(), "products": products.into_iter().take(size).collect::<Vec<_>>()}))
}

async fn product(Path(file): Path<String>) -> Json<Value> {
    match file.as_str() {
        "4600000000001.json" => Json(json!({
            "status": 1,
            "product": {"product_name": "Kefir", "brands": "Dairy",
                        "nutriments": {"energy-kcal_100g": 51, "proteins_100g": 2.9}}
        })),
        _ => Json(json!({"status": 0, "status_verbose": "product not found"})),
    }
}

async fn client() -> FoodFactsClient {
    let app = Router::new()
        .route("/cgi/search.pl", get(search))
        .route("/api/v0/product/{file}", get(product));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let config = FoodConfig { enabled: true, base_url: format!("http://{addr}/"), timeout_secs: 5 };
    FoodFactsClient::new(&config).unwrap()
}

#[tokio::test]
async fn search_skips_products_without_energy() {
    let found = client().await.search("yogurt", 20).await;
    let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Greek yogurt (Farm)", "Granola"]);
    assert!((found[1].calories_per_100g - 454.1).abs() < 1e-9);
}

#[tokio::test]
async fn search_honours_limit() {
    let found = client().await.search("yogurt", 1).await;
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn barcode_lookup() {
    let client = client().await;
    let kefir = client.barcode("4600000000001").await.expect("known barcode");
    assert_eq!(kefir.name, "Kefir");
    assert_eq!(kefir.code, "4600000000001");
    assert!(client.barcode("4600000000002").await.is_none());
}

#[tokio::test]
async fn unreachable_database_reads_as_empty() {
    let config = FoodConfig { enabled: true, base_url: "http://127.0.0.1:9".into(), timeout_secs: 1 };
    let client = FoodFactsClient::new(&config).unwrap();
    assert!(client.search("milk", 5).await.is_empty());
    assert!(client.barcode("123").await.is_none());
}
