use crate::error::ProfileError;
use crate::recommendations::RecommendationRecord;
use trai_derive::api_model;
use trai_domain::enums::{Gender, GoalType, Level, Lifestyle, Role, Weekday};
use trai_domain::schedule::TrainingDays;
use trai_identity::{UserPatch, UserRecord};

/// Shown instead of tips when the AI call fails.
pub const TIPS_FALLBACK: &str = "AI tips temporarily unavailable. Please try again later.";

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct AiTip {
    pub tip: String,
}

impl AiTip {
    pub(crate) fn all(tips: Vec<String>) -> Vec<Self> {
        tips.into_iter().map(|tip| Self { tip }).collect()
    }
}

#[api_model]
pub struct ProfileResponse {
    pub id: String,
    pub nickname: String,
    pub email: String,
    pub role: Role,
    pub profile_completed: bool,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub lifestyle: Option<Lifestyle>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub initial_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub daily_calorie_deficit: Option<i64>,
    pub avatar: Option<String>,
    pub telegram_connected: bool,
    pub level: Option<Level>,
    pub weekly_training_goal: Option<i64>,
    #[schema(value_type = Vec<Weekday>)]
    pub preferred_training_days: TrainingDays,
    pub current_goal: Option<GoalType>,
    pub ai_calorie_plan: Option<i64>,
    pub created_at: String,
    pub ai_tips: Vec<AiTip>,
}

impl ProfileResponse {
    pub(crate) fn new(user: &UserRecord, ai_tips: Vec<AiTip>) -> Self {
        Self {
            id: user.key.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            role: user.role(),
            profile_completed: user.profile_completed,
            age: user.age,
            gender: user.gender(),
            lifestyle: user.lifestyle(),
            height: user.height,
            weight: user.weight,
            initial_weight: user.initial_weight,
            target_weight: user.target_weight,
            daily_calorie_deficit: user.daily_calorie_deficit,
            avatar: user.avatar.clone(),
            telegram_connected: user.telegram_chat_id.as_deref().is_some_and(|id| !id.is_empty()),
            level: user.level(),
            weekly_training_goal: user.weekly_training_goal,
            preferred_training_days: user.training_days(),
            current_goal: user.current_goal(),
            ai_calorie_plan: user.ai_calorie_plan,
            created_at: user.created_at.clone(),
            ai_tips,
        }
    }
}

/// First-time profile completion.
#[api_model]
pub struct ProfileSetupRequest {
    pub age: i64,
    pub gender: Gender,
    pub lifestyle: Lifestyle,
    /// cm
    pub height: f64,
    /// kg
    pub weight: f64,
    pub target_weight: Option<f64>,
    pub level: Level,
    pub weekly_training_goal: i64,
}

#[api_model]
pub struct ProfileSetupResponse {
    pub success: bool,
    pub message: String,
    pub profile_completed: bool,
}

/// Partial update; absent fields are left as they are.
#[api_model]
#[derive(Default)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub lifestyle: Option<Lifestyle>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub daily_calorie_deficit: Option<i64>,
    pub level: Option<Level>,
    pub weekly_training_goal: Option<i64>,
    pub preferred_training_days: Option<Vec<Weekday>>,
}

#[api_model]
pub struct TipsRefreshResponse {
    pub success: bool,
    pub ai_tips: Vec<AiTip>,
    pub message: String,
}

#[api_model]
pub struct AvatarResponse {
    pub success: bool,
    pub avatar_url: String,
}

#[api_model]
pub struct TelegramConnectRequest {
    pub telegram_chat_id: String,
}

#[api_model]
pub struct TelegramConnectResponse {
    pub success: bool,
    pub message: String,
    pub telegram_chat_id: String,
}

#[api_model]
pub struct AiFact {
    pub id: String,
    pub message: String,
    pub created_at: String,
}

impl From<RecommendationRecord> for AiFact {
    fn from(record: RecommendationRecord) -> Self {
        Self { id: record.key, message: record.message, created_at: record.created_at }
    }
}

/// Multipart body of `POST /profile/avatar`; documentation only.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub(crate) struct AvatarForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn check_range<T: PartialOrd>(
    value: Option<T>,
    range: std::ops::RangeInclusive<T>,
    message: &'static str,
) -> Result<(), ProfileError> {
    match value {
        Some(v) if !range.contains(&v) => Err(ProfileError::Validation { message: message.into(), context: None }),
        _ => Ok(()),
    }
}

fn check_body(
    age: Option<i64>,
    height: Option<f64>,
    weight: Option<f64>,
    target_weight: Option<f64>,
    weekly_training_goal: Option<i64>,
) -> Result<(), ProfileError> {
    check_range(age, 10..=100, "age must be between 10 and 100")?;
    check_range(height, 100.0..=250.0, "height must be between 100 and 250 cm")?;
    check_range(weight, 30.0..=300.0, "weight must be between 30 and 300 kg")?;
    check_range(target_weight, 30.0..=300.0, "target_weight must be between 30 and 300 kg")?;
    check_range(weekly_training_goal, 1..=7, "weekly_training_goal must be between 1 and 7")
}

impl ProfileSetupRequest {
    pub(crate) fn validate(&self) -> Result<(), ProfileError> {
        check_body(
            Some(self.age),
            Some(self.height),
            Some(self.weight),
            self.target_weight,
            Some(self.weekly_training_goal),
        )
    }

    /// `initial_weight` starts equal to `weight`.
    pub(crate) fn to_patch(&self) -> UserPatch {
        UserPatch::new()
            .int("age", self.age)
            .text("gender", self.gender.to_string())
            .text("lifestyle", self.lifestyle.to_string())
            .float("height", self.height)
            .float("weight", self.weight)
            .float("initial_weight", self.weight)
            .maybe_float("target_weight", self.target_weight)
            .text("level", self.level.to_string())
            .int("weekly_training_goal", self.weekly_training_goal)
            .flag("profile_completed", true)
    }
}

impl ProfileUpdate {
    pub(crate) fn validate(&self) -> Result<(), ProfileError> {
        if self.nickname.as_deref().is_some_and(|n| n.trim().is_empty() || n.chars().count() > 50) {
            return Err(ProfileError::Validation {
                message: "nickname must be 1 to 50 characters".into(),
                context: None,
            });
        }
        check_range(self.daily_calorie_deficit, 0..=1500, "daily_calorie_deficit must be between 0 and 1500")?;
        check_body(self.age, self.height, self.weight, self.target_weight, self.weekly_training_goal)
    }

    pub(crate) fn to_patch(&self) -> UserPatch {
        let days = self
            .preferred_training_days
            .as_ref()
            .map(|days| days.iter().copied().collect::<TrainingDays>().to_i64());
        UserPatch::new()
            .maybe_text("nickname", self.nickname.as_deref().map(str::trim))
            .maybe_int("age", self.age)
            .maybe_text("gender", self.gender.map(|g| g.to_string()))
            .maybe_text("lifestyle", self.lifestyle.map(|l| l.to_string()))
            .maybe_float("height", self.height)
            .maybe_float("weight", self.weight)
            .maybe_float("target_weight", self.target_weight)
            .maybe_int("daily_calorie_deficit", self.daily_calorie_deficit)
            .maybe_text("level", self.level.map(|l| l.to_string()))
            .maybe_int("weekly_training_goal", self.weekly_training_goal)
            .maybe_int("preferred_training_days", days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ProfileSetupRequest {
        ProfileSetupRequest {
            age: 30,
            gender: Gender::Female,
            lifestyle: Lifestyle::Medium,
            height: 168.0,
            weight: 64.5,
            target_weight: Some(60.0),
            level: Level::Beginner,
            weekly_training_goal: 3,
        }
    }

    #[test]
    fn setup_copies_weight_into_initial_weight() {
        let patch = setup().to_patch();
        let expected = UserPatch::new()
            .int("age", 30)
            .text("gender", "female")
            .text("lifestyle", "medium")
            .float("height", 168.0)
            .float("weight", 64.5)
            .float("initial_weight", 64.5)
            .float("target_weight", 60.0)
            .text("level", "beginner")
            .int("weekly_training_goal", 3)
            .flag("profile_completed", true);
        assert_eq!(patch, expected);
    }

    #[test]
    fn setup_bounds() {
        assert!(setup().validate().is_ok());
        let mut bad = setup();
        bad.weekly_training_goal = 9;
        assert_eq!(bad.validate().unwrap_err().http_status(), 422);
        let mut bad = setup();
        bad.height = 20.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn update_touches_only_given_fields() {
        let update = ProfileUpdate {
            weight: Some(71.0),
            preferred_training_days: Some(vec![Weekday::Mon, Weekday::Fri]),
            ..ProfileUpdate::default()
        };
        assert!(update.validate().is_ok());
        let expected = UserPatch::new().float("weight", 71.0).int("preferred_training_days", 0b1_0001);
        assert_eq!(update.to_patch(), expected);
        assert!(ProfileUpdate::default().to_patch().is_empty());
    }

    #[test]
    fn blank_nickname_is_rejected() {
        let update = ProfileUpdate { nickname: Some("  ".into()), ..ProfileUpdate::default() };
        assert!(update.validate().is_err());
    }
}
