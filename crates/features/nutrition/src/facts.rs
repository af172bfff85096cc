use regex::Regex;
use std::sync::LazyLock;
use trai_derive::api_model;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lookup key for dish names: lowercase, punctuation dropped, single spaces.
#[must_use]
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let stripped = NON_WORD.replace_all(lower.trim(), "");
    SPACES.replace_all(stripped.trim(), " ").into_owned()
}

/// Energy and macros for some amount of food.
#[api_model]
#[derive(Clone, Copy, PartialEq, Default)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutritionFacts {
    #[must_use]
    pub const fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self { calories, protein, fat, carbs }
    }

    /// Scales per-100 g values to `grams`, one decimal.
    #[must_use]
    pub fn for_grams(&self, grams: f64) -> Self {
        let k = grams / 100.0;
        Self {
            calories: round1(self.calories * k),
            protein: round1(self.protein * k),
            fat: round1(self.fat * k),
            carbs: round1(self.carbs * k),
        }
    }

    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(round1(self.calories), round1(self.protein), round1(self.fat), round1(self.carbs))
    }

    /// Inverse of [`for_grams`](Self::for_grams), unrounded.
    #[must_use]
    pub fn per_100g(&self, grams: f64) -> Self {
        let k = 100.0 / grams;
        Self { calories: self.calories * k, protein: self.protein * k, fat: self.fat * k, carbs: self.carbs * k }
    }
}

impl std::ops::Add for NutritionFacts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            fat: self.fat + rhs.fat,
            carbs: self.carbs + rhs.carbs,
        }
    }
}

impl std::iter::Sum for NutritionFacts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, f| acc + f)
    }
}

impl From<trai_ai::DishNutrition> for NutritionFacts {
    fn from(n: trai_ai::DishNutrition) -> Self {
        Self::new(n.calories, n.protein, n.fat, n.carbs)
    }
}

#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Where resolved figures came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NutritionSource {
    Database,
    Cache,
    Ai,
    Approximate,
}

struct Category {
    per_100g: NutritionFacts,
    keywords: &'static [&'static str],
}

/// Checked in order; the first keyword hit wins.
const CATEGORIES: &[Category] = &[
    Category {
        per_100g: NutritionFacts::new(200.0, 20.0, 12.0, 0.0),
        keywords: &["курица", "говядина", "свинина", "индейка", "мясо", "chicken", "beef", "pork", "turkey", "meat"],
    },
    Category {
        per_100g: NutritionFacts::new(150.0, 18.0, 8.0, 0.0),
        keywords: &["рыба", "лосось", "тунец", "треска", "семга", "fish", "salmon", "tuna", "cod"],
    },
    Category {
        per_100g: NutritionFacts::new(30.0, 1.0, 0.2, 6.0),
        keywords: &[
            "овощи", "салат", "огурец", "помидор", "капуста", "брокколи", "vegetable", "salad", "cucumber", "tomato",
            "cabbage", "broccoli",
        ],
    },
    Category {
        per_100g: NutritionFacts::new(50.0, 0.5, 0.2, 12.0),
        keywords: &["фрукт", "яблоко", "банан", "апельсин", "груша", "fruit", "apple", "banana", "orange", "pear"],
    },
    Category {
        per_100g: GRAINS,
        keywords: &["каша", "рис", "гречка", "овсянка", "макароны", "porridge", "rice", "buckwheat", "oat", "pasta"],
    },
    Category {
        per_100g: NutritionFacts::new(60.0, 3.0, 3.0, 5.0),
        keywords: &["молоко", "творог", "йогурт", "кефир", "сыр", "milk", "yogurt", "kefir", "cheese", "curd"],
    },
    Category {
        per_100g: NutritionFacts::new(300.0, 4.0, 15.0, 40.0),
        keywords: &["торт", "пирог", "печенье", "шоколад", "конфеты", "cake", "pie", "cookie", "chocolate", "candy"],
    },
];

const GRAINS: NutritionFacts = NutritionFacts::new(120.0, 3.0, 1.0, 25.0);

/// Category estimate for `grams` of a dish nothing else recognised.
#[must_use]
pub fn approximate(name: &str, grams: f64) -> NutritionFacts {
    let normalized = normalize(name);
    CATEGORIES
        .iter()
        .find(|c| c.keywords.iter().any(|k| normalized.contains(k)))
        .map_or(GRAINS, |c| c.per_100g)
        .for_grams(grams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_spaces() {
        assert_eq!(normalize("  Гречка,   ВАРЕНАЯ! "), "гречка вареная");
        assert_eq!(normalize("Chicken-breast (grilled)"), "chickenbreast grilled");
        assert_eq!(normalize("Oat  milk_2"), "oat milk_2");
    }

    #[test]
    fn scaling_rounds_to_one_decimal() {
        let rice = NutritionFacts::new(130.0, 2.7, 0.3, 28.2);
        assert_eq!(rice.for_grams(200.0), NutritionFacts::new(260.0, 5.4, 0.6, 56.4));
        assert_eq!(rice.for_grams(100.0), rice);
    }

    #[test]
    fn per_100g_inverts_scaling() {
        let portion = NutritionFacts::new(300.0, 30.0, 15.0, 6.0);
        assert_eq!(portion.per_100g(200.0), NutritionFacts::new(150.0, 15.0, 7.5, 3.0));
    }

    #[test]
    fn categories_match_both_languages() {
        assert_eq!(approximate("Жареная курица", 100.0), NutritionFacts::new(200.0, 20.0, 12.0, 0.0));
        assert_eq!(approximate("Grilled salmon", 200.0), NutritionFacts::new(300.0, 36.0, 16.0, 0.0));
        assert_eq!(approximate("Chocolate cake", 50.0), NutritionFacts::new(150.0, 2.0, 7.5, 20.0));
    }

    #[test]
    fn unknown_dish_is_grains() {
        assert_eq!(approximate("mystery stew", 100.0), GRAINS);
    }

    #[test]
    fn facts_sum() {
        let total: NutritionFacts =
            [NutritionFacts::new(100.0, 1.0, 2.0, 3.0), NutritionFacts::new(50.0, 1.0, 1.0, 1.0)].into_iter().sum();
        assert_eq!(total, NutritionFacts::new(150.0, 2.0, 3.0, 4.0));
    }
}
