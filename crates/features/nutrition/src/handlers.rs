use crate::calculator::{calorie_needs, estimated_bmr, macros, tdee};
use crate::diary::{DishRecord, Meals};
use crate::dto::{
    AddDishRequest, AddDishResponse, DishEstimate, DishView, GramsRequest, MealView, PlanResponse, SearchQuery,
    TodayResponse,
};
use crate::error::NutritionError;
use crate::facts::NutritionFacts;
use crate::food_facts::{FoodFactsClient, FoodProduct};
use crate::Nutrition;
use axum::Json;
use axum::extract::{Path, State};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::info;
use trai_derive::api_handler;
use trai_domain::constants::DISHES_TAG;
use trai_domain::enums::MealType;
use trai_identity::CurrentUser;
use trai_kernel::server::{ApiError, ApiJson, ApiQuery, ApiState};
use trai_kernel::{safe_nanoid, time};

const DEFAULT_GRAMS: f64 = 100.0;
const MAX_GRAMS: f64 = 5000.0;
const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 50;

#[api_handler(
    get,
    path = "/dishes/meals",
    responses((status = OK, description = "Meal types", body = Vec<MealType>)),
    tag = DISHES_TAG,
)]
pub(crate) async fn meal_types() -> Json<Vec<MealType>> {
    Json(MealType::iter().collect())
}

#[api_handler(
    post,
    path = "/dishes/add",
    request_body = AddDishRequest,
    responses(
        (status = OK, description = "Dish added to today's meal", body = AddDishResponse),
        (status = BAD_REQUEST, description = "Unknown meal type"),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid name or grams"),
    ),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn add_dish(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<AddDishRequest>,
) -> Result<Json<AddDishResponse>, ApiError> {
    let nutrition = state.try_get_slice::<Nutrition>().map_err(|e| ApiError::from_error(500, &e))?;
    let meal_type = MealType::from_str(body.meal_type.trim()).map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid meal type: {}. Allowed: breakfast, lunch, dinner, snack",
            body.meal_type
        ))
    })?;
    let name = dish_name(&body.name)?;
    let grams = portion(body.grams.unwrap_or(DEFAULT_GRAMS))?;

    let resolved = nutrition.service.resolve(&state.database, name, grams).await.map_err(NutritionError::from)?;
    let now = time::now_stamp();
    let dish = DishRecord::new(safe_nanoid!(), name, grams, resolved.facts, resolved.source, now);
    let meal_id = Meals::add_dish(
        &state.database,
        &user.key,
        meal_type.as_ref(),
        &time::day(time::today()),
        safe_nanoid!(),
        dish.clone(),
    )
    .await
    .map_err(NutritionError::from)?;
    info!(user = %user.key, meal = %meal_id, %meal_type, dish = %dish.name, "Dish added");

    Ok(Json(AddDishResponse { message: "Dish added".to_owned(), meal_id, dish: DishView::from(dish) }))
}

#[api_handler(
    post,
    path = "/dishes/add/grams",
    request_body = GramsRequest,
    responses(
        (status = OK, description = "Nutrition for the portion", body = DishEstimate),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid name or grams"),
    ),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn estimate_grams(
    State(state): State<ApiState>,
    CurrentUser(_user): CurrentUser,
    ApiJson(body): ApiJson<GramsRequest>,
) -> Result<Json<DishEstimate>, ApiError> {
    let nutrition = state.try_get_slice::<Nutrition>().map_err(|e| ApiError::from_error(500, &e))?;
    let name = dish_name(&body.name)?;
    let grams = portion(body.grams)?;
    let resolved = nutrition.service.resolve(&state.database, name, grams).await.map_err(NutritionError::from)?;
    Ok(Json(DishEstimate { name: name.to_owned(), grams, nutrition: resolved.facts, source: resolved.source }))
}

#[api_handler(
    get,
    path = "/dishes/today",
    responses((status = OK, description = "Today's meals and totals", body = TodayResponse)),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn today(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TodayResponse>, ApiError> {
    let date = time::day(time::today());
    let meals: Vec<MealView> = Meals::for_day(&state.database, &user.key, &date)
        .await
        .map_err(NutritionError::from)?
        .into_iter()
        .map(MealView::from)
        .collect();
    let totals: NutritionFacts = meals.iter().map(|m| m.totals).sum();
    Ok(Json(TodayResponse { date, meals, totals: totals.rounded() }))
}

#[api_handler(
    get,
    path = "/dishes/search",
    params(SearchQuery),
    responses(
        (status = OK, description = "Matching products", body = Vec<FoodProduct>),
        (status = UNPROCESSABLE_ENTITY, description = "Empty query"),
        (status = SERVICE_UNAVAILABLE, description = "Food database disabled"),
    ),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn search(
    State(state): State<ApiState>,
    CurrentUser(_user): CurrentUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<FoodProduct>>, ApiError> {
    let food = food_client(&state)?;
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::unprocessable("Search query cannot be empty"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    Ok(Json(food.search(q, limit).await))
}

#[api_handler(
    get,
    path = "/dishes/barcode/{code}",
    params(("code" = String, Path, description = "EAN/UPC barcode")),
    responses(
        (status = OK, description = "Product", body = FoodProduct),
        (status = NOT_FOUND, description = "Unknown barcode"),
        (status = UNPROCESSABLE_ENTITY, description = "Not a barcode"),
        (status = SERVICE_UNAVAILABLE, description = "Food database disabled"),
    ),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn barcode(
    State(state): State<ApiState>,
    CurrentUser(_user): CurrentUser,
    Path(code): Path<String>,
) -> Result<Json<FoodProduct>, ApiError> {
    let food = food_client(&state)?;
    if code.is_empty() || code.len() > 32 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::unprocessable("Barcode must contain digits only"));
    }
    let product = food
        .barcode(&code)
        .await
        .ok_or(NutritionError::NotFound { message: "Product not found".into(), context: None })?;
    Ok(Json(product))
}

#[api_handler(
    get,
    path = "/dishes/plan",
    responses((status = OK, description = "Daily calorie and macro targets", body = PlanResponse)),
    security(("bearer" = [])),
    tag = DISHES_TAG,
)]
pub(crate) async fn plan(CurrentUser(user): CurrentUser) -> Json<PlanResponse> {
    Json(plan_for(&user))
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn plan_for(user: &trai_identity::UserRecord) -> PlanResponse {
    let calories = calorie_needs(user);
    let goal = user.current_goal();
    let bmr = estimated_bmr(user);
    PlanResponse {
        calories,
        macros: macros(calories, goal),
        goal,
        bmr: bmr.round() as i64,
        tdee: tdee(bmr, user.lifestyle()).round() as i64,
    }
}

fn food_client(state: &ApiState) -> Result<&FoodFactsClient, NutritionError> {
    state.get_slice::<Nutrition>().and_then(|n| n.food.as_ref()).ok_or(NutritionError::Unavailable {
        message: "Food database lookups are disabled".into(),
        context: None,
    })
}

fn dish_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(ApiError::unprocessable("Dish name must be 1 to 200 characters"));
    }
    Ok(name)
}

fn portion(grams: f64) -> Result<f64, ApiError> {
    if grams.is_finite() && grams > 0.0 && grams <= MAX_GRAMS {
        Ok(grams)
    } else {
        Err(ApiError::unprocessable("grams must be between 0 and 5000"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portions_are_bounded() {
        assert!(portion(150.0).is_ok());
        assert!(portion(MAX_GRAMS).is_ok());
        assert!(portion(0.0).is_err());
        assert!(portion(-5.0).is_err());
        assert!(portion(f64::NAN).is_err());
        assert!(portion(MAX_GRAMS + 1.0).is_err());
    }

    #[test]
    fn dish_names_are_trimmed() {
        assert_eq!(dish_name("  Borscht ").ok(), Some("Borscht"));
        assert!(dish_name("   ").is_err());
    }

    #[test]
    fn plan_defaults_without_profile() {
        let user = trai_identity::UserRecord::new(
            "u".into(),
            "Anna".into(),
            "a@example.com".into(),
            "h".into(),
            "2026-01-01T00:00:00Z".into(),
        );
        let plan = plan_for(&user);
        assert_eq!(plan.calories, 2000);
        assert_eq!(plan.macros.protein, 150);
        assert_eq!(plan.bmr, 1618);
        assert!(plan.goal.is_none());
    }
}
