use crate::dto::{AnalysisQuery, ProgressAnalysis, ProgressCreate, ProgressEntry};
use crate::error::ProgressError;
use crate::repository::{ProgressLog, ProgressRecord, chart_points};
use crate::Progress;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::str::FromStr;
use tracing::{debug, warn};
use trai_ai::{ChartPoint, start_tracking_message, trend_summary};
use trai_derive::api_handler;
use trai_domain::constants::PROGRESS_TAG;
use trai_domain::enums::ProgressMetric;
use trai_identity::CurrentUser;
use trai_kernel::server::{ApiError, ApiJson, ApiQuery, ApiState};
use trai_kernel::{safe_nanoid, time};

#[api_handler(
    get,
    path = "/progress",
    responses((status = OK, description = "Entries, newest first", body = Vec<ProgressEntry>)),
    security(("bearer" = [])),
    tag = PROGRESS_TAG,
)]
pub(crate) async fn list_progress(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ProgressEntry>>, ApiError> {
    let entries = ProgressLog::list(&state.database, &user.key).await.map_err(ProgressError::from)?;
    Ok(Json(entries.into_iter().map(ProgressEntry::from).collect()))
}

#[api_handler(
    post,
    path = "/progress",
    request_body = ProgressCreate,
    responses(
        (status = CREATED, description = "Entry recorded", body = ProgressEntry),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid values"),
    ),
    security(("bearer" = [])),
    tag = PROGRESS_TAG,
)]
pub(crate) async fn create_progress(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProgressCreate>,
) -> Result<(StatusCode, Json<ProgressEntry>), ApiError> {
    body.validate()?;
    let record = ProgressRecord {
        key: safe_nanoid!(),
        user_id: user.key.clone(),
        weight: body.weight,
        notes: body.notes.filter(|n| !n.trim().is_empty()),
        photo: body.photo,
        total_lifted_weight: body.total_lifted_weight,
        recovery_score: body.recovery_score,
        completed_workouts: body.completed_workouts,
        recorded_at: time::now_stamp(),
    };
    ProgressLog::record(&state.database, record.clone()).await.map_err(ProgressError::from)?;
    debug!(user = %user.key, entry = %record.key, "Progress recorded");
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[api_handler(
    get,
    path = "/progress/analysis",
    params(AnalysisQuery),
    responses(
        (status = OK, description = "Chart and commentary", body = ProgressAnalysis),
        (status = BAD_REQUEST, description = "Unknown metric"),
    ),
    security(("bearer" = [])),
    tag = PROGRESS_TAG,
)]
pub(crate) async fn analyze_progress(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<AnalysisQuery>,
) -> Result<Json<ProgressAnalysis>, ApiError> {
    let metric = ProgressMetric::from_str(query.metric.trim()).map_err(|_| ProgressError::BadRequest {
        message: format!("Invalid metric: {}. Allowed: weight, workouts, recovery", query.metric).into(),
        context: None,
    })?;

    let entries = ProgressLog::list(&state.database, &user.key).await.map_err(ProgressError::from)?;
    let points = chart_points(&entries, metric);
    let profile = user.coach_profile();

    let ai = state.get_slice::<Progress>().and_then(|slice| slice.ai.clone());
    let (analysis, ai_generated) = match ai {
        Some(client) if !points.is_empty() => {
            match client.progress_analysis(&points, metric, &profile).await {
                Ok(text) => (text, true),
                Err(e) => {
                    warn!(error = %e, user = %user.key, "Progress analysis fell back to summary");
                    (fallback_analysis(&points, metric, &profile.name), false)
                },
            }
        },
        _ => (fallback_analysis(&points, metric, &profile.name), false),
    };

    Ok(Json(ProgressAnalysis {
        metric,
        chart_data: points.into_iter().map(Into::into).collect(),
        analysis,
        ai_generated,
    }))
}

/// Text used when the model is unavailable.
pub(crate) fn fallback_analysis(points: &[ChartPoint], metric: ProgressMetric, name: &str) -> String {
    match points {
        [] => start_tracking_message(name),
        [only] => format!("{name}, first {metric} entry recorded: {} {}. Keep logging to see the trend!", only.value, only.label),
        _ => trend_summary(points, metric).unwrap_or_else(|| start_tracking_message(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(value: f64) -> ChartPoint {
        ChartPoint { date: "2026-03-01".to_owned(), value, label: "kg".to_owned() }
    }

    #[test]
    fn empty_series_asks_to_start_tracking() {
        let text = fallback_analysis(&[], ProgressMetric::Weight, "Anna");
        assert_eq!(text, start_tracking_message("Anna"));
    }

    #[test]
    fn single_point_reports_the_value() {
        let text = fallback_analysis(&[point(80.0)], ProgressMetric::Weight, "Anna");
        assert!(text.contains("first weight entry"));
        assert!(text.contains("80 kg"));
    }

    #[test]
    fn series_uses_trend_summary() {
        let text = fallback_analysis(&[point(80.0), point(78.0)], ProgressMetric::Weight, "Anna");
        assert!(text.starts_with("Weight change: -2.0 kg"));
    }
}
