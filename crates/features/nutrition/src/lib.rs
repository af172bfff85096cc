//! Nutrition slice: daily calorie plan, dish lookup with an AI cache, the meal
//! diary and `OpenFoodFacts` search.

mod calculator;
mod catalog;
mod diary;
mod dto;
mod error;
mod facts;
mod food_facts;
mod handlers;
mod service;

pub use calculator::{
    DEFAULT_CALORIES, Macros, activity_factor, bmr, calorie_needs, estimated_bmr, macro_ratios, macros, tdee,
};
pub use catalog::{CachedDish, DishCache, ProductRecord, Products};
pub use diary::{DishRecord, MealRecord, Meals};
pub use dto::{
    AddDishRequest, AddDishResponse, DishEstimate, DishView, GramsRequest, MealView, PlanResponse, SearchQuery,
    TodayResponse,
};
pub use error::{NutritionError, NutritionErrorExt};
pub use facts::{NutritionFacts, NutritionSource, approximate, normalize};
pub use food_facts::{FoodFactsClient, FoodProduct};
pub use service::{NutritionService, Resolved};

use trai_ai::AiClient;
use trai_database::{Database, Migration};
use trai_domain::config::FoodConfig;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("nutrition", "0001", include_str!("../migrations/0001_nutrition.surql"))];

#[trai_derive::trai_slice]
pub struct Nutrition {
    pub service: NutritionService,
    /// `None` when `food.enabled` is off.
    pub food: Option<FoodFactsClient>,
}

/// # Errors
/// [`NutritionError::Http`] if the food database client cannot be built.
pub fn init(food: &FoodConfig, ai: Option<AiClient>) -> Result<InitializedSlice, NutritionError> {
    let client = if food.enabled { Some(FoodFactsClient::new(food)?) } else { None };
    tracing::info!(food = client.is_some(), ai = ai.is_some(), "Nutrition slice initialized");
    Ok(InitializedSlice::new(Nutrition::new(NutritionInner { service: NutritionService::new(ai), food: client })))
}

/// Fills the product table on first start.
///
/// # Errors
/// Storage failures.
pub async fn seed(db: &Database) -> Result<usize, NutritionError> {
    let inserted = Products::seed_if_empty(db).await?;
    if inserted > 0 {
        tracing::info!(inserted, "Seeded base products");
    }
    Ok(inserted)
}

/// `/dishes/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::meal_types))
        .routes(routes!(handlers::add_dish))
        .routes(routes!(handlers::estimate_grams))
        .routes(routes!(handlers::today))
        .routes(routes!(handlers::search))
        .routes(routes!(handlers::barcode))
        .routes(routes!(handlers::plan))
}
