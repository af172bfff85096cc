//! Seven-day workout chart for the profile page.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use trai_derive::api_model;
use trai_kernel::time;
use trai_progress::ProgressRecord;

pub const WINDOW_DAYS: u64 = 7;

#[api_model]
#[derive(Clone, PartialEq)]
pub struct DayStats {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `Mon`..`Sun`
    pub day: String,
    pub completed_workouts: i64,
    pub total_weight: f64,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct WorkoutStats {
    pub chart_data: Vec<DayStats>,
    pub total_workouts_week: i64,
    pub total_weight_week: f64,
}

/// First day of the window ending with `today`, inclusive.
#[must_use]
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(WINDOW_DAYS - 1)).unwrap_or(today)
}

/// Sums progress entries per calendar day; days without entries are zero.
#[must_use]
pub fn weekly_stats(entries: &[ProgressRecord], today: NaiveDate) -> WorkoutStats {
    let mut by_day: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
    for entry in entries {
        let Some(date) = entry.recorded_at.get(..10) else { continue };
        let slot = by_day.entry(date).or_default();
        slot.0 += entry.completed_workouts;
        slot.1 += entry.total_lifted_weight;
    }

    let chart_data: Vec<DayStats> = window_start(today)
        .iter_days()
        .take(WINDOW_DAYS as usize)
        .map(|date| {
            let key = time::day(date);
            let (completed, weight) = by_day.get(key.as_str()).copied().unwrap_or_default();
            DayStats {
                day: date.format("%a").to_string(),
                date: key,
                completed_workouts: completed,
                total_weight: round1(weight),
            }
        })
        .collect();

    WorkoutStats {
        total_workouts_week: chart_data.iter().map(|d| d.completed_workouts).sum(),
        total_weight_week: round1(chart_data.iter().map(|d| d.total_weight).sum()),
        chart_data,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
