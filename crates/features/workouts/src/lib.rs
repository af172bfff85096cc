//! Workouts slice: manual and AI-generated sessions, the post-workout
//! questionnaire and the monthly AI quota for the `user` role.
//!
//! Completing a workout also appends an entry to the progress log.

mod dto;
mod error;
mod handlers;
mod model;
mod quota;
mod repository;

pub use dto::{
    CompleteRequest, CompletionResponse, ExerciseDto, GenerateRequest, GeneratedWorkoutResponse,
    ManualWorkoutRequest, WorkoutView,
};
pub use error::{WorkoutsError, WorkoutsErrorExt};
pub use model::{ExerciseRecord, TEST_QUESTIONS, WorkoutRecord, WorkoutTestRecord, recovery_score};
pub use quota::{AiQuota, AiUsage};
pub use repository::WorkoutStore;

use trai_ai::AiClient;
use trai_database::Migration;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("workouts", "0001", include_str!("../migrations/0001_workouts.surql"))];

#[trai_derive::trai_slice]
pub struct Workouts {
    pub ai: Option<AiClient>,
}

#[must_use]
pub fn init(ai: Option<AiClient>) -> InitializedSlice {
    tracing::info!(ai = ai.is_some(), "Workouts slice initialized");
    InitializedSlice::new(Workouts::from(WorkoutsInner { ai }))
}

/// `/workouts/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_workouts))
        .routes(routes!(handlers::create_manual))
        .routes(routes!(handlers::ai_usage))
        .routes(routes!(handlers::generate_ai))
        .routes(routes!(handlers::delete_workout))
        .routes(routes!(handlers::complete_workout))
}
