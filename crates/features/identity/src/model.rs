use std::str::FromStr;
use surrealdb_types::SurrealValue;
use trai_ai::CoachProfile;
use trai_domain::enums::{Gender, GoalType, Level, Lifestyle, Role};
use trai_domain::schedule::TrainingDays;

/// A `user` row. Closed vocabularies are stored as their `snake_case` names.
#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct UserRecord {
    pub key: String,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_completed: bool,
    pub created_at: String,

    pub age: Option<i64>,
    pub gender: Option<String>,
    pub lifestyle: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub initial_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub daily_calorie_deficit: Option<i64>,

    pub level: Option<String>,
    pub weekly_training_goal: Option<i64>,
    /// [`TrainingDays`] bits.
    pub preferred_training_days: i64,
    pub current_goal: Option<String>,
    pub ai_calorie_plan: Option<i64>,

    pub avatar: Option<String>,
    pub telegram_chat_id: Option<String>,

    pub ai_generations_used: i64,
    pub ai_generations_reset_at: Option<String>,
}

impl UserRecord {
    /// A fresh account with an empty profile.
    #[must_use]
    pub fn new(key: String, nickname: String, email: String, password_hash: String, created_at: String) -> Self {
        Self {
            key,
            nickname,
            email,
            password_hash,
            role: Role::User.to_string(),
            profile_completed: false,
            created_at,
            age: None,
            gender: None,
            lifestyle: None,
            height: None,
            weight: None,
            initial_weight: None,
            target_weight: None,
            daily_calorie_deficit: None,
            level: None,
            weekly_training_goal: None,
            preferred_training_days: 0,
            current_goal: None,
            ai_calorie_plan: None,
            avatar: None,
            telegram_chat_id: None,
            ai_generations_used: 0,
            ai_generations_reset_at: None,
        }
    }

    /// Unknown stored roles degrade to `user`.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_str(&self.role).unwrap_or_default()
    }

    #[must_use]
    pub fn gender(&self) -> Option<Gender> {
        parse(self.gender.as_deref())
    }

    #[must_use]
    pub fn lifestyle(&self) -> Option<Lifestyle> {
        parse(self.lifestyle.as_deref())
    }

    #[must_use]
    pub fn level(&self) -> Option<Level> {
        parse(self.level.as_deref())
    }

    #[must_use]
    pub fn current_goal(&self) -> Option<GoalType> {
        parse(self.current_goal.as_deref())
    }

    #[must_use]
    pub fn training_days(&self) -> TrainingDays {
        TrainingDays::from(self.preferred_training_days)
    }

    /// What the AI prompts are told about this user.
    #[must_use]
    pub fn coach_profile(&self) -> CoachProfile {
        CoachProfile {
            name: self.nickname.clone(),
            level: self.level.clone(),
            goal: self.current_goal.clone(),
            gender: self.gender.clone(),
            age: self.age,
            workouts_per_week: self.weekly_training_goal,
        }
    }
}

fn parse<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| T::from_str(value).ok())
}

/// One column assignment of a [`UserPatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Removes the field.
    Unset,
}

/// A partial `user` update. Column names come from code, never from input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub(crate) fields: Vec<(&'static str, PatchValue)>,
}

impl UserPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((field, PatchValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn int(mut self, field: &'static str, value: i64) -> Self {
        self.fields.push((field, PatchValue::Int(value)));
        self
    }

    #[must_use]
    pub fn float(mut self, field: &'static str, value: f64) -> Self {
        self.fields.push((field, PatchValue::Float(value)));
        self
    }

    #[must_use]
    pub fn flag(mut self, field: &'static str, value: bool) -> Self {
        self.fields.push((field, PatchValue::Bool(value)));
        self
    }

    #[must_use]
    pub fn unset(mut self, field: &'static str) -> Self {
        self.fields.push((field, PatchValue::Unset));
        self
    }

    /// Adds the assignment only when `value` is present.
    #[must_use]
    pub fn maybe_text(self, field: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(field, value),
            None => self,
        }
    }

    #[must_use]
    pub fn maybe_int(self, field: &'static str, value: Option<i64>) -> Self {
        match value {
            Some(value) => self.int(field, value),
            None => self,
        }
    }

    #[must_use]
    pub fn maybe_float(self, field: &'static str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.float(field, value),
            None => self,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_tolerate_unknown_values() {
        let mut user = UserRecord::new("k".into(), "n".into(), "e@x.io".into(), String::new(), String::new());
        assert_eq!(user.role(), Role::User);

        user.role = "admin".into();
        user.lifestyle = Some("medium".into());
        user.gender = Some("robot".into());
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(user.lifestyle(), Some(Lifestyle::Medium));
        assert_eq!(user.gender(), None);

        user.role = "root".into();
        assert_eq!(user.role(), Role::User);
    }

    #[test]
    fn maybe_setters_skip_absent_values() {
        let patch = UserPatch::new().maybe_int("age", None).maybe_float("weight", Some(70.5));
        assert_eq!(patch.fields, vec![("weight", PatchValue::Float(70.5))]);
    }
}
