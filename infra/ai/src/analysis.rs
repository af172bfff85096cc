//! Deterministic summaries that go into prompts and serve as offline fallbacks.

use crate::models::{ChartPoint, PastWorkout};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use trai_domain::enums::ProgressMetric;

const RECENT_WORKOUTS: usize = 5;
const MAX_FREQUENT: usize = 3;

/// Facts about the last five workouts relative to a target muscle group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryAnalysis {
    pub workouts_considered: usize,
    /// Exercise count per muscle group, ordered by name.
    pub muscle_frequency: BTreeMap<String, usize>,
    pub target_count: usize,
    /// Target trained twice or more; the prompt asks for variety.
    pub needs_variety: bool,
    /// Exercises repeated at least twice, first-seen order, at most three.
    pub frequent_exercises: Vec<String>,
}

#[must_use]
pub fn analyze_history(history: &[PastWorkout], target: &str) -> HistoryAnalysis {
    let recent = &history[history.len().saturating_sub(RECENT_WORKOUTS)..];

    let mut muscle_frequency = BTreeMap::new();
    let mut exercise_order: Vec<&str> = Vec::new();
    let mut exercise_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for exercise in recent.iter().flat_map(|w| &w.exercises) {
        if !exercise.muscle_group.is_empty() {
            *muscle_frequency.entry(exercise.muscle_group.clone()).or_insert(0) += 1;
        }
        if !exercise.name.is_empty() {
            let count = exercise_counts.entry(exercise.name.as_str()).or_insert(0);
            if *count == 0 {
                exercise_order.push(exercise.name.as_str());
            }
            *count += 1;
        }
    }

    let target_count = muscle_frequency.get(target).copied().unwrap_or(0);
    let frequent_exercises = exercise_order
        .into_iter()
        .filter(|name| exercise_counts.get(name).is_some_and(|&c| c >= 2))
        .take(MAX_FREQUENT)
        .map(str::to_owned)
        .collect();

    HistoryAnalysis {
        workouts_considered: recent.len(),
        muscle_frequency,
        target_count,
        needs_variety: target_count >= 2,
        frequent_exercises,
    }
}

impl HistoryAnalysis {
    /// Prompt section describing the history.
    #[must_use]
    pub fn describe(&self, target: &str) -> String {
        if self.workouts_considered == 0 {
            return "No workout history. This is the user's first workout.".to_owned();
        }

        let mut out = String::new();
        let _ = writeln!(out, "Workout history: {} most recent records", self.workouts_considered);
        let _ = writeln!(out, "Muscle group frequency: {:?}", self.muscle_frequency);

        if self.target_count == 0 {
            let _ = writeln!(
                out,
                "Muscle group '{target}' was not trained recently. Basic exercises are fine."
            );
        } else if self.needs_variety {
            let _ = writeln!(
                out,
                "Muscle group '{target}' was trained {} times recently. Suggest new exercises for variety.",
                self.target_count
            );
        } else {
            let _ = writeln!(
                out,
                "Muscle group '{target}' was trained {} times recently. Continue with progressive overload.",
                self.target_count
            );
        }

        if !self.frequent_exercises.is_empty() {
            let _ = writeln!(
                out,
                "Frequently repeated exercises: {}. Avoid repeating them.",
                self.frequent_exercises.join(", ")
            );
        }
        out
    }
}

/// One-line trend of a series; `None` with fewer than two points.
#[must_use]
pub fn trend_summary(points: &[ChartPoint], metric: ProgressMetric) -> Option<String> {
    let (first, last) = match points {
        [first, .., last] => (first.value, last.value),
        _ => return None,
    };

    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    let summary = match metric {
        ProgressMetric::Weight => {
            let change = last - first;
            let pct = if first == 0.0 { 0.0 } else { change / first * 100.0 };
            format!("Weight change: {change:+.1} kg ({pct:+.1}%) over the period")
        },
        ProgressMetric::Workouts => {
            let total: f64 = points.iter().map(|p| p.value).sum();
            format!("Total workouts: {total}, average activity: {:.1} per day", total / count)
        },
        ProgressMetric::Recovery => {
            let avg = points.iter().map(|p| p.value).sum::<f64>() / count;
            let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
            let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
            format!("Average recovery: {avg:.1}%, range: {min}-{max}%")
        },
    };
    Some(summary)
}
