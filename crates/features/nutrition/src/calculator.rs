//! Daily energy and macro targets.
//!
//! BMR uses Mifflin-St Jeor; TDEE multiplies it by the lifestyle factor.

use trai_derive::api_model;
use trai_domain::enums::{Gender, GoalType, Lifestyle};
use trai_identity::UserRecord;

/// Used when the profile has no usable body data.
pub const DEFAULT_CALORIES: i64 = 2000;

const DEFAULT_WEIGHT: f64 = 70.0;
const DEFAULT_HEIGHT: f64 = 170.0;
const DEFAULT_AGE: i64 = 30;

/// Grams per day.
#[api_model]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Macros {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bmr(weight: f64, height: f64, age: i64, gender: Gender) -> f64 {
    let base = 6.25f64.mul_add(height, 10.0 * weight) - 5.0 * age as f64;
    match gender {
        Gender::Female => base - 161.0,
        Gender::Male => base + 5.0,
    }
}

#[must_use]
pub fn activity_factor(lifestyle: Option<Lifestyle>) -> f64 {
    match lifestyle {
        Some(Lifestyle::Low) => 1.2,
        Some(Lifestyle::High) => 1.9,
        Some(Lifestyle::Medium) | None => 1.55,
    }
}

#[must_use]
pub fn tdee(bmr: f64, lifestyle: Option<Lifestyle>) -> f64 {
    bmr * activity_factor(lifestyle)
}

/// Protein, carbs and fat shares of the energy budget.
#[must_use]
pub const fn macro_ratios(goal: Option<GoalType>) -> (f64, f64, f64) {
    match goal {
        Some(GoalType::WeightLoss) => (0.35, 0.40, 0.25),
        Some(GoalType::MuscleGain) => (0.35, 0.45, 0.20),
        _ => (0.30, 0.40, 0.30),
    }
}

/// Truncated grams for `calories`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn macros(calories: i64, goal: Option<GoalType>) -> Macros {
    let (protein, carbs, fat) = macro_ratios(goal);
    let kcal = calories as f64;
    Macros {
        protein: (kcal * protein / 4.0) as i64,
        carbs: (kcal * carbs / 4.0) as i64,
        fat: (kcal * fat / 9.0) as i64,
    }
}

/// Daily calories: the stored AI plan, else TDEE from a complete profile, else 2000.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn calorie_needs(user: &UserRecord) -> i64 {
    if let Some(plan) = user.ai_calorie_plan.filter(|p| *p > 0) {
        return plan;
    }
    match (user.weight, user.height, user.age, user.lifestyle()) {
        (Some(weight), Some(height), Some(age), Some(lifestyle)) if weight > 0.0 && height > 0.0 && age > 0 => {
            let gender = user.gender().unwrap_or(Gender::Male);
            tdee(bmr(weight, height, age, gender), Some(lifestyle)) as i64
        },
        _ => DEFAULT_CALORIES,
    }
}

/// BMR with 70 kg, 170 cm and 30 years standing in for missing values.
#[must_use]
pub fn estimated_bmr(user: &UserRecord) -> f64 {
    bmr(
        user.weight.unwrap_or(DEFAULT_WEIGHT),
        user.height.unwrap_or(DEFAULT_HEIGHT),
        user.age.unwrap_or(DEFAULT_AGE),
        user.gender().unwrap_or(Gender::Male),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRecord {
        UserRecord::new("u".into(), "Anna".into(), "a@example.com".into(), "h".into(), "2026-01-01T00:00:00Z".into())
    }

    #[test]
    fn mifflin_st_jeor() {
        assert!((bmr(80.0, 180.0, 30, Gender::Male) - 1780.0).abs() < 1e-9);
        assert!((bmr(60.0, 165.0, 25, Gender::Female) - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn unknown_lifestyle_is_medium() {
        assert!((tdee(1000.0, None) - 1550.0).abs() < 1e-9);
        assert!((tdee(1000.0, Some(Lifestyle::Low)) - 1200.0).abs() < 1e-9);
        assert!((tdee(1000.0, Some(Lifestyle::High)) - 1900.0).abs() < 1e-9);
    }

    #[test]
    fn macros_truncate() {
        assert_eq!(macros(2000, Some(GoalType::WeightLoss)), Macros { protein: 175, carbs: 200, fat: 55 });
        assert_eq!(macros(2000, Some(GoalType::Endurance)), Macros { protein: 150, carbs: 200, fat: 66 });
        assert_eq!(macros(2000, None), macros(2000, Some(GoalType::Maintenance)));
        assert_eq!(macros(2500, Some(GoalType::MuscleGain)), Macros { protein: 218, carbs: 281, fat: 55 });
    }

    #[test]
    fn stored_plan_wins() {
        let mut u = user();
        u.ai_calorie_plan = Some(1850);
        u.weight = Some(80.0);
        assert_eq!(calorie_needs(&u), 1850);
        u.ai_calorie_plan = Some(0);
        assert_eq!(calorie_needs(&u), DEFAULT_CALORIES);
    }

    #[test]
    fn complete_profile_uses_tdee() {
        let mut u = user();
        u.weight = Some(80.0);
        u.height = Some(180.0);
        u.age = Some(30);
        u.lifestyle = Some("medium".into());
        assert_eq!(calorie_needs(&u), 2759);
        u.gender = Some("female".into());
        assert_eq!(calorie_needs(&u), 2501);
    }

    #[test]
    fn incomplete_profile_defaults() {
        let mut u = user();
        u.weight = Some(80.0);
        u.height = Some(180.0);
        assert_eq!(calorie_needs(&u), DEFAULT_CALORIES);
        assert!((estimated_bmr(&user()) - bmr(70.0, 170.0, 30, Gender::Male)).abs() < 1e-9);
    }
}
