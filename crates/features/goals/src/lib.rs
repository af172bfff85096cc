//! Goals slice: the user's training goal, level and preferred weekly schedule.

use axum::Json;
use axum::extract::State;
use std::borrow::Cow;
use trai_database::DatabaseError;
use trai_derive::{api_handler, api_model};
use trai_domain::constants::GOALS_TAG;
use trai_domain::enums::{GoalType, Level, Weekday};
use trai_domain::schedule::TrainingDays;
use trai_identity::{CurrentUser, UserPatch, UserRecord, Users};
use trai_kernel::server::{ApiError, ApiJson, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[trai_derive::trai_error]
pub enum GoalsError {
    #[status(404)]
    #[error("User not found")]
    UserNotFound { context: Option<Cow<'static, str>> },

    #[status(422)]
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Goals storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

impl From<GoalsError> for ApiError {
    fn from(err: GoalsError) -> Self {
        Self::from_error(err.http_status(), &err)
    }
}

#[api_model]
pub struct GoalsUpdate {
    pub goal_type: GoalType,
    pub level: Level,
    /// 1..=7
    pub days_per_week: i64,
    #[serde(default)]
    pub training_days: Vec<Weekday>,
}

#[api_model]
pub struct GoalsResponse {
    pub goal_type: Option<GoalType>,
    pub level: Option<Level>,
    pub days_per_week: Option<i64>,
    #[schema(value_type = Vec<Weekday>)]
    pub training_days: TrainingDays,
}

impl From<&UserRecord> for GoalsResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            goal_type: user.current_goal(),
            level: user.level(),
            days_per_week: user.weekly_training_goal,
            training_days: user.training_days(),
        }
    }
}

impl GoalsUpdate {
    fn validate(&self) -> Result<(), GoalsError> {
        if !(1..=7).contains(&self.days_per_week) {
            return Err(GoalsError::Validation {
                message: "days_per_week must be between 1 and 7".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn to_patch(&self) -> UserPatch {
        let days: TrainingDays = self.training_days.iter().copied().collect();
        UserPatch::new()
            .text("current_goal", self.goal_type.to_string())
            .text("level", self.level.to_string())
            .int("weekly_training_goal", self.days_per_week)
            .int("preferred_training_days", days.to_i64())
    }
}

#[api_handler(
    get,
    path = "/goals",
    responses((status = OK, description = "Current goals", body = GoalsResponse)),
    security(("bearer" = [])),
    tag = GOALS_TAG,
)]
pub(crate) async fn get_goals(CurrentUser(user): CurrentUser) -> Json<GoalsResponse> {
    Json(GoalsResponse::from(&user))
}

#[api_handler(
    put,
    path = "/goals",
    request_body = GoalsUpdate,
    responses(
        (status = OK, description = "Goals saved", body = GoalsResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid values"),
    ),
    security(("bearer" = [])),
    tag = GOALS_TAG,
)]
pub(crate) async fn update_goals(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<GoalsUpdate>,
) -> Result<Json<GoalsResponse>, ApiError> {
    body.validate()?;
    let updated = Users::update(&state.database, &user.key, body.to_patch())
        .await
        .map_err(GoalsError::from)?
        .ok_or(GoalsError::UserNotFound { context: None })?;
    tracing::debug!(user = %user.key, goal = %body.goal_type, "Goals updated");
    Ok(Json(GoalsResponse::from(&updated)))
}

/// `/goals` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(get_goals, update_goals))
}
