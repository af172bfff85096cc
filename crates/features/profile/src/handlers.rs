use crate::dashboard::{DashboardResponse, WeekData, summarize, week_start};
use crate::dto::{
    AiFact, AiTip, AvatarForm, AvatarResponse, ProfileResponse, ProfileSetupRequest, ProfileSetupResponse,
    ProfileUpdate, TIPS_FALLBACK, TelegramConnectRequest, TelegramConnectResponse, TipsRefreshResponse,
};
use crate::error::ProfileError;
use crate::recommendations::{RecommendationRecord, Recommendations, TIP};
use crate::stats::{WorkoutStats, weekly_stats, window_start};
use crate::Profile;
use axum::Json;
use axum::extract::{Multipart, State};
use chrono::Days;
use tracing::{info, warn};
use trai_derive::api_handler;
use trai_domain::constants::{DASHBOARD_TAG, PROFILE_TAG, STATIC_PREFIX};
use trai_identity::{CurrentUser, RequirePro, UserPatch, UserRecord, Users};
use trai_kernel::server::{ApiError, ApiJson, ApiState};
use trai_kernel::{safe_nanoid, time};
use trai_progress::ProgressLog;
use trai_workouts::WorkoutStore;

/// Latest recommendations on `GET /profile/ai-facts`.
const FACTS_LIMIT: i64 = 5;
/// Questionnaires plotted on the dashboard.
const ACTIVITY_POINTS: i64 = 7;

#[api_handler(
    get,
    path = "/profile",
    responses((status = OK, description = "Profile with AI tips", body = ProfileResponse)),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn get_profile(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Json<ProfileResponse> {
    let tips = tips_for(&state, &user).await;
    Json(ProfileResponse::new(&user, tips))
}

#[api_handler(
    post,
    path = "/profile/setup",
    request_body = ProfileSetupRequest,
    responses(
        (status = OK, description = "Profile completed", body = ProfileSetupResponse),
        (status = BAD_REQUEST, description = "Already completed"),
        (status = UNPROCESSABLE_ENTITY, description = "Out-of-range values"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn setup_profile(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProfileSetupRequest>,
) -> Result<Json<ProfileSetupResponse>, ApiError> {
    if user.profile_completed {
        return Err(ProfileError::BadRequest { message: "Profile is already completed".into(), context: None }.into());
    }
    body.validate()?;
    save(&state, &user.key, body.to_patch()).await?;
    info!(user = %user.key, "Profile completed");
    Ok(Json(ProfileSetupResponse {
        success: true,
        message: "Profile completed successfully".to_owned(),
        profile_completed: true,
    }))
}

#[api_handler(
    put,
    path = "/profile",
    request_body = ProfileUpdate,
    responses(
        (status = OK, description = "Updated profile", body = ProfileResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Out-of-range values"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn update_profile(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, ApiError> {
    body.validate()?;
    let updated = save(&state, &user.key, body.to_patch()).await?;
    let tips = tips_for(&state, &updated).await;
    Ok(Json(ProfileResponse::new(&updated, tips)))
}

#[api_handler(
    post,
    path = "/profile/refresh-ai-tips",
    responses(
        (status = OK, description = "Fresh tips, also stored as recommendations", body = TipsRefreshResponse),
        (status = FORBIDDEN, description = "Not pro"),
        (status = SERVICE_UNAVAILABLE, description = "AI not configured"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn refresh_tips(
    State(state): State<ApiState>,
    RequirePro(user): RequirePro,
) -> Result<Json<TipsRefreshResponse>, ApiError> {
    let ai = state
        .get_slice::<Profile>()
        .and_then(|p| p.ai.as_ref())
        .ok_or(ProfileError::AiUnavailable { context: None })?;
    let tips = ai.profile_tips(&user.coach_profile()).await.map_err(ProfileError::from)?;

    let at = time::now_stamp();
    let records = tips
        .iter()
        .map(|tip| RecommendationRecord {
            key: safe_nanoid!(),
            user_id: user.key.clone(),
            kind: TIP.to_owned(),
            message: tip.clone(),
            created_at: at.clone(),
        })
        .collect();
    Recommendations::store(&state.database, records).await.map_err(ProfileError::from)?;

    Ok(Json(TipsRefreshResponse {
        success: true,
        ai_tips: AiTip::all(tips),
        message: "AI tips refreshed".to_owned(),
    }))
}

#[api_handler(
    post,
    path = "/profile/avatar",
    request_body(content = AvatarForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Avatar stored", body = AvatarResponse),
        (status = BAD_REQUEST, description = "Not an image"),
        (status = PAYLOAD_TOO_LARGE, description = "Over the upload limit"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn upload_avatar(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let profile = state.try_get_slice::<Profile>().map_err(|e| ApiError::from_error(500, &e))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !content_type.starts_with("image/") {
            return Err(ProfileError::BadRequest { message: "Only images can be uploaded".into(), context: None }.into());
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        upload = Some((avatar_name(&user.key, &filename, &content_type), bytes));
    }
    let (name, bytes) = upload.ok_or_else(|| ApiError::unprocessable("Field 'file' is required"))?;
    if bytes.len() as u64 > profile.max_avatar_bytes {
        return Err(ApiError::payload_too_large("File is too large"));
    }

    profile.avatars.write(&name, &bytes).await.map_err(ProfileError::from)?;
    let avatar_url = format!("{STATIC_PREFIX}/{}/{name}", crate::AVATARS);
    if let Some(previous) = user.avatar.as_deref().and_then(|url| url.rsplit('/').next())
        && previous != name
        && let Err(err) = profile.avatars.delete(previous).await
    {
        warn!(user = %user.key, error = %err, "Previous avatar not removed");
    }

    save(&state, &user.key, UserPatch::new().text("avatar", avatar_url.clone())).await?;
    info!(user = %user.key, bytes = bytes.len(), "Avatar uploaded");
    Ok(Json(AvatarResponse { success: true, avatar_url }))
}

#[api_handler(
    post,
    path = "/profile/connect-telegram",
    request_body = TelegramConnectRequest,
    responses(
        (status = OK, description = "Chat id stored", body = TelegramConnectResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Blank chat id"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn connect_telegram(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<TelegramConnectRequest>,
) -> Result<Json<TelegramConnectResponse>, ApiError> {
    let chat_id = body.telegram_chat_id.trim();
    if chat_id.is_empty() || chat_id.len() > 64 {
        return Err(ApiError::unprocessable("telegram_chat_id must be 1 to 64 characters"));
    }
    save(&state, &user.key, UserPatch::new().text("telegram_chat_id", chat_id)).await?;
    Ok(Json(TelegramConnectResponse {
        success: true,
        message: "Telegram connected".to_owned(),
        telegram_chat_id: chat_id.to_owned(),
    }))
}

#[api_handler(
    get,
    path = "/profile/ai-facts",
    responses(
        (status = OK, description = "Latest stored recommendations", body = Vec<AiFact>),
        (status = FORBIDDEN, description = "Not pro"),
    ),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn ai_facts(
    State(state): State<ApiState>,
    RequirePro(user): RequirePro,
) -> Result<Json<Vec<AiFact>>, ApiError> {
    let rows = Recommendations::latest(&state.database, &user.key, FACTS_LIMIT)
        .await
        .map_err(ProfileError::from)?;
    Ok(Json(rows.into_iter().map(AiFact::from).collect()))
}

#[api_handler(
    get,
    path = "/profile/workout-stats",
    responses((status = OK, description = "Last seven days, today included", body = WorkoutStats)),
    security(("bearer" = [])),
    tag = PROFILE_TAG,
)]
pub(crate) async fn workout_stats(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<WorkoutStats>, ApiError> {
    let today = time::today();
    let (from, to) = (time::day(window_start(today)), time::day(next_day(today)));
    let entries = ProgressLog::between(&state.database, &user.key, &from, &to)
        .await
        .map_err(ProfileError::from)?;
    Ok(Json(weekly_stats(&entries, today)))
}

#[api_handler(
    get,
    path = "/dashboard",
    responses((status = OK, description = "Weekly overview", body = DashboardResponse)),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn dashboard(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let today = time::today();
    let (from, to) = (time::day(week_start(today)), time::day(next_day(today)));
    let db = &state.database;
    let week = WeekData {
        workouts: WorkoutStore::completed_between(db, &user.key, &from, &to)
            .await
            .map_err(ProfileError::from)?,
        progress: ProgressLog::between(db, &user.key, &from, &to).await.map_err(ProfileError::from)?,
        tests: WorkoutStore::recent_tests(db, &user.key, ACTIVITY_POINTS).await.map_err(ProfileError::from)?,
    };

    let (mut response, snapshot) = summarize(&user, &week);
    if let Some(ai) = state.get_slice::<Profile>().and_then(|p| p.ai.as_ref()) {
        match ai.greeting(&user.coach_profile(), &snapshot).await {
            Ok(text) if !text.trim().is_empty() => response.greeting = text,
            Ok(_) => {},
            Err(err) => warn!(user = %user.key, error = %err, "Greeting generation failed"),
        }
    }
    Ok(Json(response))
}

/// Tips only for completed profiles; none without AI, a fallback tip when AI fails.
async fn tips_for(state: &ApiState, user: &UserRecord) -> Vec<AiTip> {
    if !user.profile_completed {
        return Vec::new();
    }
    let Some(ai) = state.get_slice::<Profile>().and_then(|p| p.ai.as_ref()) else {
        return Vec::new();
    };
    match ai.profile_tips(&user.coach_profile()).await {
        Ok(tips) => AiTip::all(tips),
        Err(err) => {
            warn!(user = %user.key, error = %err, "Profile tips unavailable");
            vec![AiTip { tip: TIPS_FALLBACK.to_owned() }]
        },
    }
}

async fn save(state: &ApiState, key: &str, patch: UserPatch) -> Result<UserRecord, ProfileError> {
    Users::update(&state.database, key, patch).await?.ok_or(ProfileError::UserNotFound { context: None })
}

fn next_day(day: chrono::NaiveDate) -> chrono::NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(day)
}

/// `user_<id>.<ext>`, the extension taken from the file name or else the MIME subtype.
fn avatar_name(user_id: &str, filename: &str, content_type: &str) -> String {
    let usable = |ext: &&str| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(usable)
        .or_else(|| content_type.strip_prefix("image/").filter(usable))
        .map_or_else(|| "img".to_owned(), str::to_ascii_lowercase);
    format!("user_{user_id}.{ext}")
}
