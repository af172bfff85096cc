//! `OpenFoodFacts` search and barcode lookups.
//!
//! Failures never surface to callers: a broken upstream reads as "nothing found".

use crate::error::NutritionError;
use crate::facts::round1;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use trai_derive::api_model;
use trai_domain::config::FoodConfig;

const FIELDS: &str = "product_name,product_name_ru,brands,nutriments,code,image_url,categories";
/// Energy above this per 100 g is taken to be kJ.
const KJ_THRESHOLD: f64 = 1000.0;
const KJ_TO_KCAL: f64 = 0.239;

/// A product with per-100 g figures.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct FoodProduct {
    pub name: String,
    pub code: String,
    pub image_url: String,
    pub categories: String,
    pub source: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    product_name_ru: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    nutriments: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchReply {
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BarcodeReply {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct FoodFactsClient {
    http: reqwest::Client,
    base_url: String,
}

impl FoodFactsClient {
    /// # Errors
    /// [`NutritionError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &FoodConfig) -> Result<Self, NutritionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("TrAi/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    /// Up to `limit` products matching `query`. Empty on any upstream failure.
    pub async fn search(&self, query: &str, limit: u32) -> Vec<FoodProduct> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let limit = limit.to_string();
        let request = self.http.get(&url).query(&[
            ("search_terms", query),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", limit.as_str()),
            ("fields", FIELDS),
        ]);

        let reply: SearchReply = match fetch(request).await {
            Some(reply) => reply,
            None => return Vec::new(),
        };
        let products: Vec<FoodProduct> = reply.products.into_iter().filter_map(|p| parse_product(p, true)).collect();
        debug!(query, found = products.len(), "Food search finished");
        products
    }

    /// The product behind `barcode`, if the database knows it and has energy data.
    pub async fn barcode(&self, barcode: &str) -> Option<FoodProduct> {
        let url = format!("{}/api/v0/product/{barcode}.json", self.base_url);
        let reply: BarcodeReply = fetch(self.http.get(&url)).await?;
        if reply.status != 1 {
            return None;
        }
        let mut product = parse_product(reply.product?, false)?;
        product.code = barcode.to_owned();
        Some(product)
    }
}

async fn fetch<T: serde::de::DeserializeOwned>(request: reqwest::RequestBuilder) -> Option<T> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Food database unreachable");
            return None;
        },
    };
    if !response.status().is_success() {
        warn!(status = %response.status(), "Food database returned an error");
        return None;
    }
    match response.json::<T>().await {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(error = %e, "Food database reply was not understood");
            None
        },
    }
}

/// Builds a product from a raw record. `with_brand` appends ` (brand)` to the name.
pub(crate) fn parse_product(raw: Value, with_brand: bool) -> Option<FoodProduct> {
    let raw: RawProduct = serde_json::from_value(raw).ok()?;
    let name = [raw.product_name_ru.as_deref(), raw.product_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())?
        .to_owned();
    let name = match raw.brands.as_deref().map(str::trim) {
        Some(brand) if with_brand && !brand.is_empty() => format!("{name} ({brand})"),
        _ => name,
    };

    let number = |key: &str| raw.nutriments.get(key).and_then(as_number);
    let mut calories = number("energy-kcal_100g").filter(|v| *v != 0.0).or_else(|| number("energy_100g"))?;
    if calories > KJ_THRESHOLD {
        calories *= KJ_TO_KCAL;
    }

    Some(FoodProduct {
        name,
        code: raw.code.unwrap_or_default(),
        image_url: raw.image_url.unwrap_or_default(),
        categories: raw.categories.unwrap_or_default(),
        source: "openfoodfacts".to_owned(),
        calories_per_100g: round1(calories),
        protein_per_100g: round1(number("proteins_100g").unwrap_or(0.0)),
        fat_per_100g: round1(number("fat_100g").unwrap_or(0.0)),
        carbs_per_100g: round1(number("carbohydrates_100g").unwrap_or(0.0)),
    })
}

/// Nutriment values arrive as numbers or numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_russian_name_and_appends_brand() {
        let product = parse_product(
            json!({
                "product_name": "Nutella",
                "product_name_ru": "Нутелла",
                "brands": "Ferrero",
                "code": "3017620422003",
                "nutriments": {"energy-kcal_100g": 539, "proteins_100g": 6.3, "fat_100g": 30.9, "carbohydrates_100g": 57.5}
            }),
            true,
        )
        .expect("product");
        assert_eq!(product.name, "Нутелла (Ferrero)");
        assert_eq!(product.code, "3017620422003");
        assert!((product.calories_per_100g - 539.0).abs() < f64::EPSILON);
        assert_eq!(product.source, "openfoodfacts");
    }

    #[test]
    fn kilojoules_are_converted() {
        let product = parse_product(
            json!({"product_name": "Oats", "nutriments": {"energy_100g": "1500", "proteins_100g": "13"}}),
            true,
        )
        .expect("product");
        assert!((product.calories_per_100g - 358.5).abs() < 1e-9);
        assert!((product.protein_per_100g - 13.0).abs() < f64::EPSILON);
        assert!(product.fat_per_100g.abs() < f64::EPSILON);
    }

    #[test]
    fn products_without_energy_or_name_are_skipped() {
        assert!(parse_product(json!({"product_name": "Water", "nutriments": {"fat_100g": 0}}), true).is_none());
        assert!(parse_product(json!({"product_name": " ", "nutriments": {"energy_100g": 100}}), true).is_none());
        assert!(parse_product(json!("not an object"), true).is_none());
    }
}
