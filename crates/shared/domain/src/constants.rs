//! Shared names: `OpenAPI` tags, table names and HTTP prefixes.

pub const API_PREFIX: &str = "/api/v1";
pub const STATIC_PREFIX: &str = "/static";

pub const SYSTEM_TAG: &str = "System";
pub const AUTH_TAG: &str = "Auth";
pub const ADMIN_TAG: &str = "Admin";
pub const PROFILE_TAG: &str = "Profile";
pub const DASHBOARD_TAG: &str = "Dashboard";
pub const GOALS_TAG: &str = "Goals";
pub const DISHES_TAG: &str = "Dishes";
pub const WORKOUTS_TAG: &str = "Workouts";
pub const PROGRESS_TAG: &str = "Progress";
pub const ATTACHMENTS_TAG: &str = "Attachments";

pub mod tables {
    pub const USER: &str = "user";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const WORKOUT: &str = "workout";
    pub const WORKOUT_TEST: &str = "workout_test";
    pub const PROGRESS: &str = "progress";
    pub const MEAL: &str = "meal";
    pub const PRODUCT: &str = "product";
    pub const AI_NUTRITION_CACHE: &str = "ai_nutrition_cache";
    pub const AI_RECOMMENDATION: &str = "ai_recommendation";
    pub const ATTACHMENT: &str = "attachment";
}

/// Monthly AI workout generations for the `user` role.
pub const AI_MONTHLY_LIMIT: i64 = 3;
