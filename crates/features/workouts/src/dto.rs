use crate::error::WorkoutsError;
use crate::model::{ExerciseRecord, WorkoutRecord};
use crate::quota::AiUsage;
use trai_derive::api_model;

#[api_model]
pub struct ExerciseDto {
    pub name: String,
    /// Free text such as `chest` or `quads`.
    pub muscle_group: String,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: i64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub intensity: Option<String>,
}

const fn default_sets() -> i64 {
    3
}

const fn default_reps() -> i64 {
    10
}

/// Upper bound for both `sets` and `reps`.
pub const MAX_COUNT: i64 = 1000;
/// Upper bound for `weight`, kg.
pub const MAX_WEIGHT: f64 = 1000.0;

impl From<ExerciseRecord> for ExerciseDto {
    fn from(e: ExerciseRecord) -> Self {
        Self { name: e.name, muscle_group: e.muscle_group, sets: e.sets, reps: e.reps, weight: e.weight, intensity: e.intensity }
    }
}

impl ExerciseDto {
    fn into_record(self) -> Result<ExerciseRecord, WorkoutsError> {
        let name = self.name.trim();
        let problem = if name.is_empty() {
            Some("Exercise name cannot be empty")
        } else if !(1..=MAX_COUNT).contains(&self.sets) || !(1..=MAX_COUNT).contains(&self.reps) {
            Some("sets and reps must be between 1 and 1000")
        } else if !(0.0..=MAX_WEIGHT).contains(&self.weight) {
            Some("weight must be between 0 and 1000 kg")
        } else {
            None
        };
        if let Some(message) = problem {
            return Err(WorkoutsError::Validation { message: message.into(), context: None });
        }
        Ok(ExerciseRecord {
            name: name.to_owned(),
            muscle_group: self.muscle_group.trim().to_owned(),
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            intensity: self.intensity.filter(|i| !i.trim().is_empty()),
        })
    }
}

pub(crate) fn exercise_records(exercises: Vec<ExerciseDto>) -> Result<Vec<ExerciseRecord>, WorkoutsError> {
    exercises.into_iter().map(ExerciseDto::into_record).collect()
}

#[api_model]
pub struct ManualWorkoutRequest {
    pub name: String,
    /// One of the workout muscle groups, e.g. `upper_body_push`.
    pub muscle_group: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseDto>,
    /// RFC 3339; defaults to now.
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[api_model]
pub struct GenerateRequest {
    pub muscle_group: String,
}

#[api_model]
pub struct CompleteRequest {
    /// Eight answers, each 1..=10.
    pub answers: Vec<i64>,
}

#[api_model]
pub struct WorkoutView {
    pub id: String,
    pub name: String,
    pub muscle_group: String,
    pub scheduled_at: String,
    pub completed: bool,
    pub ai_generated: bool,
    pub difficulty: Option<String>,
    pub total_weight_lifted: f64,
    pub exercises: Vec<ExerciseDto>,
}

impl From<WorkoutRecord> for WorkoutView {
    fn from(w: WorkoutRecord) -> Self {
        Self {
            id: w.key,
            name: w.name,
            muscle_group: w.muscle_group,
            scheduled_at: w.scheduled_at,
            completed: w.completed,
            ai_generated: w.ai_generated,
            difficulty: w.difficulty,
            total_weight_lifted: w.total_weight_lifted,
            exercises: w.exercises.into_iter().map(ExerciseDto::from).collect(),
        }
    }
}

#[api_model]
pub struct GeneratedWorkoutResponse {
    pub workout: WorkoutView,
    pub description: String,
    pub ai_usage: AiUsage,
}

#[api_model]
pub struct CompletionResponse {
    pub workout_id: String,
    pub recovery_score: f64,
    pub total_weight_lifted: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(sets: i64, reps: i64, weight: f64) -> ExerciseDto {
        ExerciseDto {
            name: "Squat".into(),
            muscle_group: "legs".into(),
            sets,
            reps,
            weight,
            intensity: None,
        }
    }

    #[test]
    fn counts_and_weight_are_bounded() {
        assert!(exercise(MAX_COUNT, MAX_COUNT, MAX_WEIGHT).into_record().is_ok());
        for bad in [
            exercise(0, 10, 50.0),
            exercise(3, 0, 50.0),
            exercise(MAX_COUNT + 1, 10, 50.0),
            exercise(3, i64::MAX, 50.0),
            exercise(3, 10, -1.0),
            exercise(3, 10, f64::NAN),
            exercise(3, 10, MAX_WEIGHT + 0.5),
        ] {
            let err = bad.into_record().expect_err("out of range");
            assert_eq!(err.http_status(), 422);
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut blank = exercise(3, 10, 0.0);
        blank.name = "   ".into();
        assert!(blank.into_record().is_err());
    }
}
