use crate::error::ProgressError;
use crate::repository::ProgressRecord;
use serde::Deserialize;
use trai_ai::ChartPoint;
use trai_derive::api_model;
use trai_domain::enums::ProgressMetric;
use utoipa::IntoParams;

#[api_model]
pub struct ProgressCreate {
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    pub total_lifted_weight: f64,
    /// 0..=100
    #[serde(default)]
    pub recovery_score: f64,
    #[serde(default)]
    pub completed_workouts: i64,
}

impl ProgressCreate {
    pub(crate) fn validate(&self) -> Result<(), ProgressError> {
        let problem = if self.weight.is_some_and(|w| !(w > 0.0 && w < 500.0)) {
            Some("weight must be between 0 and 500 kg")
        } else if !(0.0..=100.0).contains(&self.recovery_score) {
            Some("recovery_score must be between 0 and 100")
        } else if self.total_lifted_weight < 0.0 || self.completed_workouts < 0 {
            Some("Totals cannot be negative")
        } else {
            None
        };
        match problem {
            Some(message) => Err(ProgressError::Validation { message: message.into(), context: None }),
            None => Ok(()),
        }
    }
}

#[api_model]
pub struct ProgressEntry {
    pub id: String,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub total_lifted_weight: f64,
    pub recovery_score: f64,
    pub completed_workouts: i64,
    pub recorded_at: String,
}

impl From<ProgressRecord> for ProgressEntry {
    fn from(record: ProgressRecord) -> Self {
        Self {
            id: record.key,
            weight: record.weight,
            notes: record.notes,
            photo: record.photo,
            total_lifted_weight: record.total_lifted_weight,
            recovery_score: record.recovery_score,
            completed_workouts: record.completed_workouts,
            recorded_at: record.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalysisQuery {
    /// `weight`, `workouts` or `recovery`.
    pub metric: String,
}

#[api_model]
pub struct ChartPointView {
    pub date: String,
    pub value: f64,
    pub label: String,
}

impl From<ChartPoint> for ChartPointView {
    fn from(point: ChartPoint) -> Self {
        Self { date: point.date, value: point.value, label: point.label }
    }
}

#[api_model]
pub struct ProgressAnalysis {
    pub metric: ProgressMetric,
    pub chart_data: Vec<ChartPointView>,
    pub analysis: String,
    /// `true` when the text came from the model.
    pub ai_generated: bool,
}
