use crate::catalog::{CachedDish, DishCache, Products};
use crate::facts::{NutritionFacts, NutritionSource, approximate};
use tracing::{debug, warn};
use trai_ai::AiClient;
use trai_database::{Database, DatabaseError};
use trai_kernel::time;

/// Figures for a portion and where they came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub facts: NutritionFacts,
    pub source: NutritionSource,
}

/// Resolves a dish through the product table, the AI cache, the model and
/// finally a category estimate.
#[derive(Debug, Clone)]
pub struct NutritionService {
    ai: Option<AiClient>,
}

impl NutritionService {
    #[must_use]
    pub const fn new(ai: Option<AiClient>) -> Self {
        Self { ai }
    }

    /// # Errors
    /// Storage failures. Model failures fall through to the estimate.
    pub async fn resolve(&self, db: &Database, dish: &str, grams: f64) -> Result<Resolved, DatabaseError> {
        if let Some(product) = Products::lookup(db, dish).await? {
            debug!(dish, product = %product.name, "Nutrition from product table");
            return Ok(Resolved { facts: product.per_100g().for_grams(grams), source: NutritionSource::Database });
        }

        if let Some(cached) = DishCache::hit(db, dish).await? {
            debug!(dish, uses = cached.usage_count, "Nutrition from cache");
            return Ok(Resolved { facts: cached.per_100g().for_grams(grams), source: NutritionSource::Cache });
        }

        if let Some(ai) = &self.ai {
            match ai.analyze_dish(dish, grams).await {
                Ok(analysis) => {
                    let facts = NutritionFacts::from(analysis);
                    DishCache::store(db, CachedDish::new(dish, grams, facts, ai.model(), &time::now_stamp())).await?;
                    return Ok(Resolved { facts, source: NutritionSource::Ai });
                },
                Err(e) => warn!(error = %e, dish, "AI dish analysis failed, estimating"),
            }
        }

        Ok(Resolved { facts: approximate(dish, grams), source: NutritionSource::Approximate })
    }
}
