//! Profile slice: body data and AI tips, avatar upload, the Telegram chat id,
//! the seven-day workout chart and the weekly dashboard.

mod dashboard;
mod dto;
mod error;
mod handlers;
mod recommendations;
mod stats;

pub use dashboard::{
    ActivityPoint, AiPlan, BotStatus, DashboardResponse, QuickActions, QuickStats, WeekData, WeeklyProgress,
    fallback_greeting, summarize, week_start,
};
pub use dto::{
    AiFact, AiTip, AvatarResponse, ProfileResponse, ProfileSetupRequest, ProfileSetupResponse, ProfileUpdate,
    TIPS_FALLBACK, TelegramConnectRequest, TelegramConnectResponse, TipsRefreshResponse,
};
pub use error::{ProfileError, ProfileErrorExt};
pub use recommendations::{RecommendationRecord, Recommendations, TIP};
pub use stats::{DayStats, WorkoutStats, weekly_stats, window_start};

use axum::extract::DefaultBodyLimit;
use trai_ai::AiClient;
use trai_database::Migration;
use trai_domain::config::StorageConfig;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use trai_storage::{NamespacedStorage, Storage};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("profile", "0001", include_str!("../migrations/0001_profile.surql"))];

/// Directory under the static root that holds avatars.
pub const AVATARS: &str = "avatars";

const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[trai_derive::trai_slice]
pub struct Profile {
    pub ai: Option<AiClient>,
    pub avatars: NamespacedStorage,
    pub max_avatar_bytes: u64,
}

/// # Errors
/// [`ProfileError::Storage`] when the static root cannot be prepared.
pub async fn init(cfg: &StorageConfig, ai: Option<AiClient>) -> Result<InitializedSlice, ProfileError> {
    let statics = Storage::builder().root(&cfg.static_dir).sharded(false).connect().await?;
    let avatars = statics.namespace(AVATARS)?;
    tracing::info!(ai = ai.is_some(), "Profile slice initialized");
    Ok(InitializedSlice::new(Profile::new(ProfileInner {
        ai,
        avatars,
        max_avatar_bytes: cfg.max_upload_bytes,
    })))
}

/// `/profile/*` and `/dashboard` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::get_profile, handlers::update_profile))
        .routes(routes!(handlers::setup_profile))
        .routes(routes!(handlers::refresh_tips))
        .routes(routes!(handlers::upload_avatar))
        .routes(routes!(handlers::connect_telegram))
        .routes(routes!(handlers::ai_facts))
        .routes(routes!(handlers::workout_stats))
        .routes(routes!(handlers::dashboard))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
