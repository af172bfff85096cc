//! Dashboard numbers for the current Monday-based week.

use crate::stats::round1;
use chrono::{Datelike, Days, NaiveDate};
use trai_ai::DashboardSnapshot;
use trai_derive::api_model;
use trai_identity::UserRecord;
use trai_nutrition::{calorie_needs, macros};
use trai_progress::ProgressRecord;
use trai_workouts::{WorkoutRecord, WorkoutTestRecord};

/// Weekly target when the profile has none.
pub const DEFAULT_PLANNED: i64 = 3;

#[api_model]
#[derive(Clone, PartialEq)]
pub struct WeeklyProgress {
    pub planned_workouts: i64,
    pub completed_workouts: i64,
    /// Capped at 100.
    pub percentage: f64,
}

#[api_model]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AiPlan {
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct QuickStats {
    pub weekly_workouts: i64,
    pub total_workouts_goal: i64,
    /// Working weight averaged over every rep of the week.
    pub average_weight: f64,
    /// 0..=100
    pub average_recovery: f64,
    pub goal_progress: i64,
    pub goal_remaining: i64,
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct QuickActions {
    pub open_stats: String,
    pub change_goal: String,
    pub start_workout: String,
}

impl Default for QuickActions {
    fn default() -> Self {
        Self {
            open_stats: "Open statistics".to_owned(),
            change_goal: "Change goal".to_owned(),
            start_workout: "Start workout".to_owned(),
        }
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct BotStatus {
    pub connected: bool,
    /// `green` or `red`
    pub status_color: String,
}

/// Energy and mood from one post-workout questionnaire, scaled to 0..=100.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct ActivityPoint {
    pub energy: f64,
    pub mood: f64,
    pub timestamp: String,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct DashboardResponse {
    pub message: String,
    pub greeting: String,
    pub activity_graph: Vec<ActivityPoint>,
    pub weekly_progress: WeeklyProgress,
    pub ai_plan: AiPlan,
    pub quick_stats: QuickStats,
    pub quick_actions: QuickActions,
    pub bot_status: BotStatus,
}

/// What the dashboard is computed from.
#[derive(Debug, Clone, Default)]
pub struct WeekData {
    pub workouts: Vec<WorkoutRecord>,
    pub progress: Vec<ProgressRecord>,
    pub tests: Vec<WorkoutTestRecord>,
}

#[must_use]
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let offset = u64::from(today.weekday().num_days_from_monday());
    today.checked_sub_days(Days::new(offset)).unwrap_or(today)
}

#[must_use]
pub fn fallback_greeting(name: &str) -> String {
    format!("Hi, {name}! Glad to see you again!")
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weekly_progress(planned: i64, completed: i64) -> WeeklyProgress {
    let percentage =
        if planned > 0 { round1((completed as f64 / planned as f64 * 100.0).min(100.0)) } else { 0.0 };
    WeeklyProgress { planned_workouts: planned, completed_workouts: completed, percentage }
}

#[must_use]
pub fn ai_plan(user: &UserRecord) -> AiPlan {
    let calories = calorie_needs(user);
    let split = macros(calories, user.current_goal());
    AiPlan { calories, protein: split.protein, fat: split.fat, carbs: split.carbs }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_weight(workouts: &[WorkoutRecord]) -> f64 {
    let (lifted, reps) = workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .fold((0.0, 0_i64), |(lifted, reps), e| {
            let done = e.sets * e.reps;
            (e.weight.mul_add(done as f64, lifted), reps + done)
        });
    if reps > 0 { round1(lifted / reps as f64) } else { 0.0 }
}

/// Mean of the non-zero recovery scores.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_recovery(progress: &[ProgressRecord]) -> f64 {
    let scores: Vec<f64> = progress.iter().map(|p| p.recovery_score).filter(|s| *s > 0.0).collect();
    if scores.is_empty() { 0.0 } else { round1(scores.iter().sum::<f64>() / scores.len() as f64) }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn activity_graph(tests: &[WorkoutTestRecord]) -> Vec<ActivityPoint> {
    tests
        .iter()
        .map(|t| ActivityPoint {
            energy: (t.energy_level * 10) as f64,
            mood: (t.mood * 10) as f64,
            timestamp: t.created_at.clone(),
        })
        .collect()
}

#[must_use]
pub fn bot_status(user: &UserRecord) -> BotStatus {
    let connected = user.telegram_chat_id.as_deref().is_some_and(|id| !id.is_empty());
    BotStatus { connected, status_color: if connected { "green" } else { "red" }.to_owned() }
}

/// Everything but the greeting, plus the snapshot the greeting prompt needs.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn summarize(user: &UserRecord, week: &WeekData) -> (DashboardResponse, DashboardSnapshot) {
    let planned = user.weekly_training_goal.filter(|g| *g > 0).unwrap_or(DEFAULT_PLANNED);
    let completed = i64::try_from(week.workouts.len()).unwrap_or(i64::MAX);
    let progress = weekly_progress(planned, completed);
    let recovery = average_recovery(&week.progress);

    let snapshot = DashboardSnapshot {
        planned_workouts: planned,
        completed_workouts: completed,
        completion_rate: progress.percentage.round() as i64,
        total_weight_lifted: round1(week.workouts.iter().map(|w| w.total_weight_lifted).sum()),
        recovery_score: recovery,
    };

    let response = DashboardResponse {
        message: "User dashboard".to_owned(),
        greeting: fallback_greeting(&user.nickname),
        activity_graph: activity_graph(&week.tests),
        quick_stats: QuickStats {
            weekly_workouts: completed,
            total_workouts_goal: planned,
            average_weight: average_weight(&week.workouts),
            average_recovery: recovery,
            goal_progress: completed.min(planned),
            goal_remaining: (planned - completed).max(0),
        },
        weekly_progress: progress,
        ai_plan: ai_plan(user),
        quick_actions: QuickActions::default(),
        bot_status: bot_status(user),
    };
    (response, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trai_workouts::ExerciseRecord;

    fn user() -> UserRecord {
        UserRecord::new("u1".into(), "Ann".into(), "ann@x.io".into(), String::new(), String::new())
    }

    fn exercise(sets: i64, reps: i64, weight: f64) -> ExerciseRecord {
        ExerciseRecord {
            name: "Squat".into(),
            muscle_group: "legs".into(),
            sets,
            reps,
            weight,
            intensity: None,
        }
    }

    fn done(total: f64, exercises: Vec<ExerciseRecord>) -> WorkoutRecord {
        WorkoutRecord {
            key: "w".into(),
            user_id: "u1".into(),
            name: "Legs".into(),
            muscle_group: "lower_body".into(),
            scheduled_at: "2026-10-13T08:00:00Z".into(),
            completed: true,
            completed_at: Some("2026-10-13T09:00:00Z".into()),
            ai_generated: false,
            difficulty: None,
            total_weight_lifted: total,
            exercises,
        }
    }

    #[test]
    fn weeks_start_on_monday() {
        let friday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(week_start(friday), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn progress_percentage_is_capped() {
        assert!((weekly_progress(3, 1).percentage - 33.3).abs() < 1e-9);
        assert!((weekly_progress(3, 5).percentage - 100.0).abs() < 1e-9);
        assert!(weekly_progress(0, 2).percentage.abs() < 1e-9);
    }

    #[test]
    fn average_weight_is_per_rep() {
        let workouts = [done(0.0, vec![exercise(1, 10, 50.0), exercise(1, 8, 60.0), exercise(1, 12, 55.0)])];
        assert!((average_weight(&workouts) - 54.7).abs() < 1e-9);
        assert!(average_weight(&[]).abs() < 1e-9);
    }

    #[test]
    fn empty_week_uses_defaults() {
        let (dash, snapshot) = summarize(&user(), &WeekData::default());
        assert_eq!(dash.weekly_progress.planned_workouts, DEFAULT_PLANNED);
        assert_eq!(dash.quick_stats.goal_remaining, 3);
        assert_eq!(dash.ai_plan.calories, 2000);
        assert_eq!(dash.greeting, "Hi, Ann! Glad to see you again!");
        assert_eq!(dash.bot_status, BotStatus { connected: false, status_color: "red".into() });
        assert_eq!(snapshot.completion_rate, 0);
    }

    #[test]
    fn week_counts_flow_into_stats() {
        let mut user = user();
        user.weekly_training_goal = Some(2);
        user.telegram_chat_id = Some("12345".into());
        let first = ProgressRecord::workout("p1".into(), "u1".into(), 1500.0, 75.0, "2026-10-13T09:00:00Z".into());
        let mut second = first.clone();
        second.key = "p2".into();
        second.recovery_score = 85.0;
        let week = WeekData {
            workouts: vec![done(1500.0, vec![exercise(3, 10, 50.0)])],
            progress: vec![first, second],
            tests: Vec::new(),
        };
        let (dash, snapshot) = summarize(&user, &week);
        assert!((dash.weekly_progress.percentage - 50.0).abs() < 1e-9);
        assert_eq!(dash.quick_stats.goal_progress, 1);
        assert_eq!(dash.quick_stats.goal_remaining, 1);
        assert!((dash.quick_stats.average_recovery - 80.0).abs() < 1e-9);
        assert!(dash.bot_status.connected);
        assert!((snapshot.total_weight_lifted - 1500.0).abs() < 1e-9);
    }
}
