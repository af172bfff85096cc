use crate::dto::{
    CompleteRequest, CompletionResponse, GenerateRequest, GeneratedWorkoutResponse, ManualWorkoutRequest,
    MAX_COUNT, WorkoutView, exercise_records,
};
use crate::error::WorkoutsError;
use crate::model::{ExerciseRecord, TEST_QUESTIONS, WorkoutRecord, WorkoutTestRecord};
use crate::quota::{AiQuota, AiUsage};
use crate::repository::WorkoutStore;
use crate::Workouts;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::borrow::Cow;
use std::str::FromStr;
use tracing::{error, info, warn};
use trai_ai::{GeneratedWorkout, PastWorkout};
use trai_derive::api_handler;
use trai_domain::constants::{AI_MONTHLY_LIMIT, WORKOUTS_TAG};
use trai_domain::enums::{Level, MuscleGroup};
use trai_identity::{CurrentUser, Users};
use trai_kernel::server::{ApiError, ApiJson, ApiState};
use trai_kernel::{safe_nanoid, time};
use trai_progress::{ProgressLog, ProgressRecord};

/// Past workouts shown to the model.
const HISTORY_DEPTH: i64 = 5;

#[api_handler(
    get,
    path = "/workouts/list",
    responses((status = OK, description = "Workouts, newest first", body = Vec<WorkoutView>)),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn list_workouts(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WorkoutView>>, ApiError> {
    let workouts = WorkoutStore::list(&state.database, &user.key).await.map_err(WorkoutsError::from)?;
    Ok(Json(workouts.into_iter().map(WorkoutView::from).collect()))
}

#[api_handler(
    post,
    path = "/workouts/create-manual",
    request_body = ManualWorkoutRequest,
    responses(
        (status = OK, description = "Workout created", body = WorkoutView),
        (status = BAD_REQUEST, description = "Unknown muscle group"),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid exercise values"),
    ),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn create_manual(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ManualWorkoutRequest>,
) -> Result<Json<WorkoutView>, ApiError> {
    let group = parse_group(&body.muscle_group)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(validation("Workout name cannot be empty").into());
    }
    let scheduled_at = match body.scheduled_at.as_deref() {
        Some(raw) => time::parse(raw).map(time::stamp).ok_or_else(|| validation("scheduled_at must be RFC 3339"))?,
        None => time::now_stamp(),
    };

    let workout = WorkoutRecord {
        key: safe_nanoid!(),
        user_id: user.key.clone(),
        name: name.to_owned(),
        muscle_group: group.to_string(),
        scheduled_at,
        completed: false,
        completed_at: None,
        ai_generated: false,
        difficulty: body.difficulty.filter(|d| !d.trim().is_empty()),
        total_weight_lifted: 0.0,
        exercises: exercise_records(body.exercises)?,
    };
    WorkoutStore::create(&state.database, workout.clone()).await.map_err(WorkoutsError::from)?;
    info!(user = %user.key, workout = %workout.key, %group, "Manual workout created");
    Ok(Json(workout.into()))
}

#[api_handler(
    get,
    path = "/workouts/ai-usage",
    responses((status = OK, description = "AI generations this month", body = AiUsage)),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn ai_usage(CurrentUser(user): CurrentUser) -> Json<AiUsage> {
    Json(AiUsage::of(&user, time::now()))
}

#[api_handler(
    post,
    path = "/workouts/generate-ai",
    request_body = GenerateRequest,
    responses(
        (status = OK, description = "Generated and stored", body = GeneratedWorkoutResponse),
        (status = BAD_REQUEST, description = "Unknown muscle group"),
        (status = FORBIDDEN, description = "Monthly limit reached"),
        (status = SERVICE_UNAVAILABLE, description = "AI is not configured"),
    ),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn generate_ai(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<GeneratedWorkoutResponse>, ApiError> {
    let group = parse_group(&body.muscle_group)?;

    let now = time::now();
    let usage = AiUsage::of(&user, now);
    if usage.exhausted() {
        return Err(WorkoutsError::QuotaExceeded { limit: usage.limit.unwrap_or_default() }.into());
    }
    let Some(ai) = state.get_slice::<Workouts>().and_then(|slice| slice.ai.clone()) else {
        return Err(WorkoutsError::AiUnavailable { context: None }.into());
    };

    if !AiQuota::claim(&state.database, &user.key, usage.unlimited, now).await.map_err(WorkoutsError::from)? {
        return Err(WorkoutsError::QuotaExceeded { limit: usage.limit.unwrap_or(AI_MONTHLY_LIMIT) }.into());
    }

    let outcome = async {
        let history: Vec<PastWorkout> = WorkoutStore::recent(&state.database, &user.key, HISTORY_DEPTH)
            .await?
            .iter()
            .map(PastWorkout::from)
            .collect();

        let generated = ai.generate_workout(&user.coach_profile(), group.as_ref(), &history).await.map_err(|e| {
            error!(error = %e, user = %user.key, "AI workout generation failed");
            WorkoutsError::from(e)
        })?;

        let description = generated.description.clone();
        let workout = generated_record(generated, &user.key, group, user.level(), time::stamp(now));
        WorkoutStore::create(&state.database, workout.clone()).await?;
        Ok::<_, WorkoutsError>((workout, description))
    }
    .await;
    let (workout, description) = match outcome {
        Ok(done) => done,
        Err(err) => {
            if let Err(e) = AiQuota::release(&state.database, &user.key).await {
                warn!(error = %e, user = %user.key, "Failed to release AI generation");
            }
            return Err(err.into());
        }
    };

    let updated = Users::find(&state.database, &user.key).await.map_err(WorkoutsError::from)?.unwrap_or(user);
    info!(user = %updated.key, workout = %workout.key, %group, "AI workout generated");

    Ok(Json(GeneratedWorkoutResponse {
        workout: workout.into(),
        description,
        ai_usage: AiUsage::of(&updated, now),
    }))
}

#[api_handler(
    delete,
    path = "/workouts/{workout_id}",
    params(("workout_id" = String, Path, description = "Workout id")),
    responses(
        (status = NO_CONTENT, description = "Deleted"),
        (status = NOT_FOUND, description = "No such workout for this user"),
    ),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn delete_workout(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(workout_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted =
        WorkoutStore::delete_owned(&state.database, &user.key, &workout_id).await.map_err(WorkoutsError::from)?;
    if !deleted {
        return Err(WorkoutsError::NotFound { context: None }.into());
    }
    info!(user = %user.key, workout = %workout_id, "Workout deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/workouts/{workout_id}/complete",
    params(("workout_id" = String, Path, description = "Workout id")),
    request_body = CompleteRequest,
    responses(
        (status = OK, description = "Completed", body = CompletionResponse),
        (status = BAD_REQUEST, description = "Already completed"),
        (status = NOT_FOUND, description = "No such workout for this user"),
        (status = UNPROCESSABLE_ENTITY, description = "Answers missing or out of range"),
    ),
    security(("bearer" = [])),
    tag = WORKOUTS_TAG,
)]
pub(crate) async fn complete_workout(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(workout_id): Path<String>,
    ApiJson(body): ApiJson<CompleteRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let answers = parse_answers(&body.answers)?;
    let workout = WorkoutStore::find_owned(&state.database, &user.key, &workout_id)
        .await
        .map_err(WorkoutsError::from)?
        .ok_or(WorkoutsError::NotFound { context: None })?;
    if workout.completed {
        return Err(already_completed().into());
    }

    let now = time::now_stamp();
    let total = workout.total_volume();
    let test = WorkoutTestRecord::new(safe_nanoid!(), user.key.clone(), workout.key.clone(), answers, now.clone());
    let recovery = test.recovery_score;

    if !WorkoutStore::complete(&state.database, test, total).await.map_err(WorkoutsError::from)? {
        return Err(already_completed().into());
    }
    ProgressLog::record(
        &state.database,
        ProgressRecord::workout(safe_nanoid!(), user.key.clone(), total, recovery, now),
    )
    .await
    .map_err(WorkoutsError::from)?;
    info!(user = %user.key, workout = %workout.key, recovery, total, "Workout completed");

    Ok(Json(CompletionResponse { workout_id: workout.key, recovery_score: recovery, total_weight_lifted: total }))
}

fn parse_group(raw: &str) -> Result<MuscleGroup, WorkoutsError> {
    MuscleGroup::from_str(raw.trim()).map_err(|_| WorkoutsError::BadRequest {
        message: format!(
            "Invalid muscle group: {raw}. Allowed: upper_body_push, upper_body_pull, lower_body, core, full_body, cardio"
        )
        .into(),
        context: None,
    })
}

pub(crate) fn parse_answers(answers: &[i64]) -> Result<[i64; TEST_QUESTIONS], WorkoutsError> {
    let fixed: [i64; TEST_QUESTIONS] =
        answers.try_into().map_err(|_| validation("All 8 questions must be answered"))?;
    if fixed.iter().any(|a| !(1..=10).contains(a)) {
        return Err(validation("Each answer must be between 1 and 10"));
    }
    Ok(fixed)
}

const fn already_completed() -> WorkoutsError {
    WorkoutsError::BadRequest { message: Cow::Borrowed("Workout already completed"), context: None }
}

fn validation(message: &'static str) -> WorkoutsError {
    WorkoutsError::Validation { message: message.into(), context: None }
}

pub(crate) fn generated_record(
    generated: GeneratedWorkout,
    user_id: &str,
    group: MuscleGroup,
    level: Option<Level>,
    scheduled_at: String,
) -> WorkoutRecord {
    let difficulty = match level {
        Some(Level::Beginner) => "easy",
        Some(Level::Professional) => "hard",
        Some(Level::Amateur) | None => "medium",
    };
    let name = match generated.name.trim() {
        "" => format!("AI workout: {group}"),
        name => name.to_owned(),
    };
    WorkoutRecord {
        key: safe_nanoid!(),
        user_id: user_id.to_owned(),
        name,
        muscle_group: group.to_string(),
        scheduled_at,
        completed: false,
        completed_at: None,
        ai_generated: true,
        difficulty: Some(difficulty.to_owned()),
        total_weight_lifted: 0.0,
        exercises: generated
            .exercises
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .map(|e| ExerciseRecord {
                name: e.name.trim().to_owned(),
                muscle_group: e.muscle_group,
                sets: e.sets.clamp(1, MAX_COUNT),
                reps: e.reps.clamp(1, MAX_COUNT),
                weight: 0.0,
                intensity: e.intensity,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trai_ai::GeneratedExercise;

    #[test]
    fn answers_need_eight_values_in_range() {
        assert_eq!(parse_answers(&[5, 3, 5, 7, 3, 5, 8, 10]).ok(), Some([5, 3, 5, 7, 3, 5, 8, 10]));
        assert!(parse_answers(&[5; 7]).is_err());
        assert!(parse_answers(&[5; 9]).is_err());
        assert!(parse_answers(&[0, 5, 5, 5, 5, 5, 5, 5]).is_err());
        assert!(parse_answers(&[11, 5, 5, 5, 5, 5, 5, 5]).is_err());
    }

    #[test]
    fn answer_errors_are_unprocessable() {
        let err = parse_answers(&[]).expect_err("empty answers");
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn unknown_group_is_bad_request() {
        assert_eq!(parse_group(" lower_body ").ok(), Some(MuscleGroup::LowerBody));
        let err = parse_group("invalid_group").expect_err("unknown group");
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().starts_with("Invalid muscle group: invalid_group"));
    }

    #[test]
    fn generated_workout_is_flagged_and_weightless() {
        let generated = GeneratedWorkout {
            name: String::new(),
            description: "Push day".into(),
            exercises: vec![
                GeneratedExercise {
                    name: "Push-up".into(),
                    muscle_group: "chest".into(),
                    sets: 0,
                    reps: 12,
                    intensity: Some("low".into()),
                    reason: None,
                },
                GeneratedExercise {
                    name: "  ".into(),
                    muscle_group: String::new(),
                    sets: 3,
                    reps: 10,
                    intensity: None,
                    reason: None,
                },
            ],
        };
        let record = generated_record(
            generated,
            "u1",
            MuscleGroup::UpperBodyPush,
            Some(Level::Beginner),
            "2026-03-01T00:00:00Z".into(),
        );
        assert!(record.ai_generated);
        assert_eq!(record.name, "AI workout: upper_body_push");
        assert_eq!(record.difficulty.as_deref(), Some("easy"));
        assert_eq!(record.exercises.len(), 1);
        assert_eq!(record.exercises[0].sets, 1);
        assert!(record.exercises[0].weight.abs() < f64::EPSILON);
    }
}
