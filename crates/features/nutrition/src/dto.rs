use crate::calculator::Macros;
use crate::diary::{DishRecord, MealRecord};
use crate::facts::{NutritionFacts, NutritionSource};
use serde::Deserialize;
use trai_derive::api_model;
use trai_domain::enums::GoalType;
use utoipa::IntoParams;

#[api_model]
pub struct AddDishRequest {
    pub name: String,
    /// `breakfast`, `lunch`, `dinner` or `snack`.
    pub meal_type: String,
    /// Defaults to 100.
    #[serde(default)]
    pub grams: Option<f64>,
}

#[api_model]
pub struct GramsRequest {
    pub name: String,
    pub grams: f64,
}

#[api_model]
pub struct DishView {
    pub id: String,
    pub name: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub source: String,
}

impl From<DishRecord> for DishView {
    fn from(d: DishRecord) -> Self {
        Self {
            id: d.key,
            name: d.name,
            grams: d.grams,
            calories: d.calories,
            protein: d.protein,
            fat: d.fat,
            carbs: d.carbs,
            source: d.source,
        }
    }
}

#[api_model]
pub struct AddDishResponse {
    pub message: String,
    pub meal_id: String,
    pub dish: DishView,
}

/// Nutrition for a portion, not stored.
#[api_model(deny_unknown_fields = false)]
pub struct DishEstimate {
    pub name: String,
    pub grams: f64,
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    pub source: NutritionSource,
}

#[api_model]
pub struct MealView {
    pub id: String,
    pub meal_type: String,
    pub eaten_at: String,
    pub dishes: Vec<DishView>,
    pub totals: NutritionFacts,
}

impl From<MealRecord> for MealView {
    fn from(meal: MealRecord) -> Self {
        let totals = meal.totals();
        Self {
            id: meal.key,
            meal_type: meal.meal_type,
            eaten_at: meal.eaten_at,
            dishes: meal.dishes.into_iter().map(DishView::from).collect(),
            totals,
        }
    }
}

#[api_model]
pub struct TodayResponse {
    pub date: String,
    pub meals: Vec<MealView>,
    pub totals: NutritionFacts,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: String,
    /// 1..=50, default 20.
    pub limit: Option<u32>,
}

#[api_model(deny_unknown_fields = false)]
pub struct PlanResponse {
    pub calories: i64,
    #[serde(flatten)]
    pub macros: Macros,
    pub goal: Option<GoalType>,
    /// Mifflin-St Jeor estimate, rounded.
    pub bmr: i64,
    pub tdee: i64,
}
