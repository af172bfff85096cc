//! Per-day meals with embedded dishes.

use crate::facts::{NutritionFacts, NutritionSource};
use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};

#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct DishRecord {
    pub key: String,
    pub name: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    /// `database`, `cache`, `ai` or `approximate`.
    pub source: String,
    pub added_at: String,
}

impl DishRecord {
    #[must_use]
    pub fn new(key: String, name: &str, grams: f64, facts: NutritionFacts, source: NutritionSource, at: String) -> Self {
        let source = match source {
            NutritionSource::Database => "database",
            NutritionSource::Cache => "cache",
            NutritionSource::Ai => "ai",
            NutritionSource::Approximate => "approximate",
        };
        Self {
            key,
            name: name.trim().to_owned(),
            grams,
            calories: facts.calories,
            protein: facts.protein,
            fat: facts.fat,
            carbs: facts.carbs,
            source: source.to_owned(),
            added_at: at,
        }
    }

    #[must_use]
    pub const fn facts(&self) -> NutritionFacts {
        NutritionFacts::new(self.calories, self.protein, self.fat, self.carbs)
    }
}

#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct MealRecord {
    pub key: String,
    pub user_id: String,
    pub meal_type: String,
    /// `YYYY-MM-DD`.
    pub day: String,
    pub eaten_at: String,
    pub dishes: Vec<DishRecord>,
}

impl MealRecord {
    #[must_use]
    pub fn totals(&self) -> NutritionFacts {
        self.dishes.iter().map(DishRecord::facts).sum::<NutritionFacts>().rounded()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Meals;

impl Meals {
    /// Appends `dish` to the user's meal of `meal_type` on `day`, creating the
    /// meal with `new_key` when there is none. Returns the meal key.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn add_dish(
        db: &Database,
        user_id: &str,
        meal_type: &str,
        day: &str,
        new_key: String,
        dish: DishRecord,
    ) -> Result<String, DatabaseError> {
        if let Some(meal) = Self::find(db, user_id, meal_type, day).await? {
            db.query("UPDATE meal SET dishes += $dish WHERE key = $key RETURN NONE")
                .bind(("dish", dish))
                .bind(("key", meal.key.clone()))
                .await
                .context("Adding dish")?
                .check()
                .context("Adding dish")?;
            return Ok(meal.key);
        }

        let meal = MealRecord {
            key: new_key,
            user_id: user_id.to_owned(),
            meal_type: meal_type.to_owned(),
            day: day.to_owned(),
            eaten_at: dish.added_at.clone(),
            dishes: vec![dish],
        };
        let key = meal.key.clone();
        db.query("CREATE meal CONTENT $meal RETURN NONE")
            .bind(("meal", meal))
            .await
            .context("Creating meal")?
            .check()
            .context("Creating meal")?;
        Ok(key)
    }

    /// # Errors
    /// Storage failures.
    pub async fn find(
        db: &Database,
        user_id: &str,
        meal_type: &str,
        day: &str,
    ) -> Result<Option<MealRecord>, DatabaseError> {
        let mut meals: Vec<MealRecord> = db
            .query("SELECT * OMIT id FROM meal WHERE user_id = $user AND day = $day AND meal_type = $type LIMIT 1")
            .bind(("user", user_id.to_owned()))
            .bind(("day", day.to_owned()))
            .bind(("type", meal_type.to_owned()))
            .await
            .context("Loading meal")?
            .take(0)
            .context("Decoding meal")?;
        Ok(meals.pop())
    }

    /// Meals of one day in the order they were started.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn for_day(db: &Database, user_id: &str, day: &str) -> Result<Vec<MealRecord>, DatabaseError> {
        let meals: Vec<MealRecord> = db
            .query("SELECT * OMIT id FROM meal WHERE user_id = $user AND day = $day ORDER BY eaten_at ASC")
            .bind(("user", user_id.to_owned()))
            .bind(("day", day.to_owned()))
            .await
            .context("Loading meals")?
            .take(0)
            .context("Decoding meals")?;
        Ok(meals)
    }
}
