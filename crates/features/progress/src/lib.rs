//! Progress slice: the user's weight and training log, chart series per metric
//! and a short AI commentary on the trend.
//!
//! The workouts slice writes here through [`ProgressLog::record`] whenever a
//! workout is completed.

mod dto;
mod error;
mod handlers;
mod repository;

pub use dto::{AnalysisQuery, ChartPointView, ProgressAnalysis, ProgressCreate, ProgressEntry};
pub use error::{ProgressError, ProgressErrorExt};
pub use repository::{ProgressLog, ProgressRecord, chart_points};

use trai_ai::AiClient;
use trai_database::Migration;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("progress", "0001", include_str!("../migrations/0001_progress.surql"))];

#[trai_derive::trai_slice]
pub struct Progress {
    /// `None` keeps the analysis on the deterministic summary.
    pub ai: Option<AiClient>,
}

#[must_use]
pub fn init(ai: Option<AiClient>) -> InitializedSlice {
    tracing::info!(ai = ai.is_some(), "Progress slice initialized");
    InitializedSlice::new(Progress::from(ProgressInner { ai }))
}

/// `/progress` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_progress, handlers::create_progress))
        .routes(routes!(handlers::analyze_progress))
}
