//! The `product` reference table and the `ai_nutrition_cache` table.

use crate::facts::{NutritionFacts, normalize};
use serde::Deserialize;
use surrealdb_types::SurrealValue;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};
use trai_kernel::{safe_nanoid, time};

const SEED: &str = include_str!("../data/products.json");

#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct ProductRecord {
    pub key: String,
    pub name: String,
    pub name_lower: String,
    pub name_variants: Vec<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
    pub category: Option<String>,
    pub verified: bool,
    pub source: String,
    pub created_at: String,
}

impl ProductRecord {
    #[must_use]
    pub const fn per_100g(&self) -> NutritionFacts {
        NutritionFacts::new(self.calories_per_100g, self.protein_per_100g, self.fat_per_100g, self.carbs_per_100g)
    }
}

#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    #[serde(default)]
    name_variants: Vec<String>,
    calories_per_100g: f64,
    protein_per_100g: f64,
    fat_per_100g: f64,
    carbs_per_100g: f64,
    category: Option<String>,
}

impl SeedProduct {
    fn into_record(self, created_at: &str) -> ProductRecord {
        ProductRecord {
            key: safe_nanoid!(),
            name_lower: normalize(&self.name),
            name_variants: self.name_variants.iter().map(|v| normalize(v)).collect(),
            name: self.name,
            calories_per_100g: self.calories_per_100g,
            protein_per_100g: self.protein_per_100g,
            fat_per_100g: self.fat_per_100g,
            carbs_per_100g: self.carbs_per_100g,
            category: self.category,
            verified: true,
            source: "manual".to_owned(),
            created_at: created_at.to_owned(),
        }
    }
}

#[derive(Debug, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
struct Count {
    count: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Products;

impl Products {
    /// # Errors
    /// Storage failures.
    pub async fn count(db: &Database) -> Result<i64, DatabaseError> {
        let counts: Vec<Count> = db
            .query("SELECT count() AS count FROM product GROUP ALL")
            .await
            .context("Counting products")?
            .take(0)
            .context("Decoding product count")?;
        Ok(counts.first().map_or(0, |c| c.count))
    }

    /// Loads the bundled base products when the table is empty. Returns how many were inserted.
    ///
    /// # Errors
    /// Storage failures or a malformed bundled list.
    pub async fn seed_if_empty(db: &Database) -> Result<usize, DatabaseError> {
        if Self::count(db).await? > 0 {
            return Ok(0);
        }
        let seed: Vec<SeedProduct> = serde_json::from_str(SEED).map_err(|e| DatabaseError::Validation {
            message: format!("Bundled product list: {e}").into(),
            context: None,
        })?;
        let now = time::now_stamp();
        let records: Vec<ProductRecord> = seed.into_iter().map(|p| p.into_record(&now)).collect();
        let inserted = records.len();

        db.query("INSERT INTO product $products RETURN NONE")
            .bind(("products", records))
            .await
            .context("Seeding products")?
            .check()
            .context("Seeding products")?;
        Ok(inserted)
    }

    /// # Errors
    /// Storage failures.
    pub async fn insert(db: &Database, product: ProductRecord) -> Result<(), DatabaseError> {
        db.query("CREATE product CONTENT $product RETURN NONE")
            .bind(("product", product))
            .await
            .context("Creating product")?
            .check()
            .context("Creating product")?;
        Ok(())
    }

    /// Exact normalized name, then a listed variant, then for multi-word names a
    /// substring match on the first word longer than three characters.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn lookup(db: &Database, dish: &str) -> Result<Option<ProductRecord>, DatabaseError> {
        let normalized = normalize(dish);
        if normalized.is_empty() {
            return Ok(None);
        }
        if let Some(found) = Self::first(db, "name_lower = $term", &normalized).await? {
            return Ok(Some(found));
        }
        if let Some(found) = Self::first(db, "name_variants CONTAINS $term", &normalized).await? {
            return Ok(Some(found));
        }

        let words: Vec<&str> = normalized.split(' ').collect();
        if words.len() > 1 {
            let main = words.iter().find(|w| w.chars().count() > 3).unwrap_or(&words[0]);
            return Self::first(db, "string::contains(name_lower, $term)", main).await;
        }
        Ok(None)
    }

    async fn first(db: &Database, condition: &str, term: &str) -> Result<Option<ProductRecord>, DatabaseError> {
        let mut found: Vec<ProductRecord> = db
            .query(format!("SELECT * OMIT id FROM product WHERE {condition} LIMIT 1"))
            .bind(("term", term.to_owned()))
            .await
            .context("Looking up product")?
            .take(0)
            .context("Decoding product")?;
        Ok(found.pop())
    }
}

#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct CachedDish {
    pub dish_name: String,
    pub normalized_name: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
    pub source: String,
    pub usage_count: i64,
    pub created_at: String,
    pub last_used_at: String,
}

impl CachedDish {
    #[must_use]
    pub fn new(dish_name: &str, grams: f64, portion: NutritionFacts, source: &str, now: &str) -> Self {
        let per_100g = portion.per_100g(grams);
        Self {
            dish_name: dish_name.trim().to_owned(),
            normalized_name: normalize(dish_name),
            grams,
            calories: portion.calories,
            protein: portion.protein,
            fat: portion.fat,
            carbs: portion.carbs,
            calories_per_100g: per_100g.calories,
            protein_per_100g: per_100g.protein,
            fat_per_100g: per_100g.fat,
            carbs_per_100g: per_100g.carbs,
            source: source.to_owned(),
            usage_count: 1,
            created_at: now.to_owned(),
            last_used_at: now.to_owned(),
        }
    }

    #[must_use]
    pub const fn per_100g(&self) -> NutritionFacts {
        NutritionFacts::new(self.calories_per_100g, self.protein_per_100g, self.fat_per_100g, self.carbs_per_100g)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DishCache;

impl DishCache {
    /// Cached analysis for `dish`, counting the hit.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn hit(db: &Database, dish: &str) -> Result<Option<CachedDish>, DatabaseError> {
        let normalized = normalize(dish);
        let mut found: Vec<CachedDish> = db
            .query(
                "UPDATE ai_nutrition_cache SET usage_count += 1, last_used_at = $now \
                    WHERE normalized_name = $name RETURN NONE;\
                 SELECT * OMIT id FROM ai_nutrition_cache WHERE normalized_name = $name LIMIT 1;",
            )
            .bind(("name", normalized))
            .bind(("now", time::now_stamp()))
            .await
            .context("Reading nutrition cache")?
            .take(1)
            .context("Decoding cached dish")?;
        Ok(found.pop())
    }

    /// Inserts or refreshes the entry for the dish. An existing entry keeps its
    /// creation time and counts one more use.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn store(db: &Database, entry: CachedDish) -> Result<(), DatabaseError> {
        let existing: Vec<String> = db
            .query("SELECT VALUE normalized_name FROM ai_nutrition_cache WHERE normalized_name = $name")
            .bind(("name", entry.normalized_name.clone()))
            .await
            .context("Reading nutrition cache")?
            .take(0)
            .context("Decoding cached dish")?;

        let sql = if existing.is_empty() {
            "CREATE ai_nutrition_cache CONTENT $entry RETURN NONE"
        } else {
            "UPDATE ai_nutrition_cache MERGE { \
                dish_name: $entry.dish_name, grams: $entry.grams, \
                calories: $entry.calories, protein: $entry.protein, fat: $entry.fat, carbs: $entry.carbs, \
                calories_per_100g: $entry.calories_per_100g, protein_per_100g: $entry.protein_per_100g, \
                fat_per_100g: $entry.fat_per_100g, carbs_per_100g: $entry.carbs_per_100g, \
                source: $entry.source, last_used_at: $entry.last_used_at \
             } WHERE normalized_name = $entry.normalized_name RETURN NONE;\
             UPDATE ai_nutrition_cache SET usage_count += 1 \
                WHERE normalized_name = $entry.normalized_name RETURN NONE;"
        };
        db.query(sql)
            .bind(("entry", entry))
            .await
            .context("Caching dish analysis")?
            .check()
            .context("Caching dish analysis")?;
        Ok(())
    }
}
