use surrealdb_types::SurrealValue;
use trai_ai::{PastExercise, PastWorkout};

/// Exercise embedded in a workout row.
#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct ExerciseRecord {
    pub name: String,
    pub muscle_group: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub intensity: Option<String>,
}

impl ExerciseRecord {
    /// `sets × reps × weight`, multiplied in `f64` so stored counts never overflow.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn volume(&self) -> f64 {
        self.sets as f64 * self.reps as f64 * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct WorkoutRecord {
    pub key: String,
    pub user_id: String,
    pub name: String,
    pub muscle_group: String,
    pub scheduled_at: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub ai_generated: bool,
    pub difficulty: Option<String>,
    pub total_weight_lifted: f64,
    pub exercises: Vec<ExerciseRecord>,
}

impl WorkoutRecord {
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(ExerciseRecord::volume).sum()
    }
}

impl From<&WorkoutRecord> for PastWorkout {
    fn from(workout: &WorkoutRecord) -> Self {
        Self {
            exercises: workout
                .exercises
                .iter()
                .map(|e| PastExercise { name: e.name.clone(), muscle_group: e.muscle_group.clone() })
                .collect(),
        }
    }
}

/// Post-workout wellbeing questionnaire.
#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct WorkoutTestRecord {
    pub key: String,
    pub user_id: String,
    pub workout_id: String,
    pub energy_level: i64,
    pub mood: i64,
    pub muscle_soreness: i64,
    pub sleep_quality: i64,
    pub appetite: i64,
    pub motivation: i64,
    pub focus: i64,
    pub overall_condition: i64,
    pub recovery_score: f64,
    pub created_at: String,
}

/// Number of questions in the post-workout test.
pub const TEST_QUESTIONS: usize = 8;

/// Mean answer times ten, unrounded: 10..=100 for valid answers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recovery_score(answers: &[i64; TEST_QUESTIONS]) -> f64 {
    let mean = answers.iter().sum::<i64>() as f64 / TEST_QUESTIONS as f64;
    mean * 10.0
}

impl WorkoutTestRecord {
    #[must_use]
    pub fn new(
        key: String,
        user_id: String,
        workout_id: String,
        answers: [i64; TEST_QUESTIONS],
        created_at: String,
    ) -> Self {
        let [energy_level, mood, muscle_soreness, sleep_quality, appetite, motivation, focus, overall_condition] =
            answers;
        Self {
            key,
            user_id,
            workout_id,
            energy_level,
            mood,
            muscle_soreness,
            sleep_quality,
            appetite,
            motivation,
            focus,
            overall_condition,
            recovery_score: recovery_score(&answers),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_is_mean_times_ten() {
        assert!((recovery_score(&[5; 8]) - 50.0).abs() < f64::EPSILON);
        assert!((recovery_score(&[10; 8]) - 100.0).abs() < f64::EPSILON);
        assert!((recovery_score(&[5, 3, 5, 7, 3, 5, 8, 10]) - 57.5).abs() < 1e-9);
    }

    #[test]
    fn recovery_keeps_every_decimal() {
        assert!((recovery_score(&[5, 5, 5, 5, 5, 5, 5, 10]) - 56.25).abs() < 1e-9);
        assert!((recovery_score(&[1, 1, 1, 1, 1, 1, 1, 2]) - 11.25).abs() < 1e-9);
    }

    #[test]
    fn volume_sums_sets_reps_weight() {
        let bench = ExerciseRecord {
            name: "Bench press".into(),
            muscle_group: "chest".into(),
            sets: 3,
            reps: 10,
            weight: 60.0,
            intensity: None,
        };
        let push_up = ExerciseRecord { name: "Push-up".into(), weight: 0.0, ..bench.clone() };
        assert!((bench.volume() - 1800.0).abs() < f64::EPSILON);
        assert!(push_up.volume().abs() < f64::EPSILON);
    }

    #[test]
    fn volume_of_huge_counts_does_not_overflow() {
        let stored = ExerciseRecord {
            name: "Legacy row".into(),
            muscle_group: "legs".into(),
            sets: i64::MAX / 2,
            reps: 3,
            weight: 1.0,
            intensity: None,
        };
        let volume = stored.volume();
        assert!(volume.is_finite());
        assert!(volume > 1.0e19);
    }

    #[test]
    fn test_record_names_answers_in_order() {
        let record = WorkoutTestRecord::new(
            "t".into(),
            "u".into(),
            "w".into(),
            [1, 2, 3, 4, 5, 6, 7, 8],
            "2026-03-01T00:00:00Z".into(),
        );
        assert_eq!(record.energy_level, 1);
        assert_eq!(record.overall_condition, 8);
        assert!((record.recovery_score - 45.0).abs() < f64::EPSILON);
    }
}
