use serde::{Deserialize, Serialize};

/// What the prompts know about the person being coached.
#[derive(Debug, Clone, Default)]
pub struct CoachProfile {
    pub name: String,
    pub level: Option<String>,
    pub goal: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub workouts_per_week: Option<i64>,
}

/// Nutrition figures for a given portion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DishNutrition {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExercise {
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: i64,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

const fn default_sets() -> i64 {
    3
}

const fn default_reps() -> i64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkout {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<GeneratedExercise>,
}

/// A past workout as seen by the history analysis.
#[derive(Debug, Clone, Default)]
pub struct PastWorkout {
    pub exercises: Vec<PastExercise>,
}

#[derive(Debug, Clone, Default)]
pub struct PastExercise {
    pub name: String,
    pub muscle_group: String,
}

/// One point of a progress chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
    pub label: String,
}

/// Weekly numbers fed into the dashboard greeting.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub planned_workouts: i64,
    pub completed_workouts: i64,
    pub completion_rate: i64,
    pub total_weight_lifted: f64,
    pub recovery_score: f64,
}
