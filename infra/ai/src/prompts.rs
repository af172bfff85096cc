use crate::analysis::HistoryAnalysis;
use crate::models::{ChartPoint, CoachProfile, DashboardSnapshot};

fn or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.unwrap_or(fallback)
}

pub(crate) fn profile_tips(profile: &CoachProfile) -> String {
    let frequency = profile
        .workouts_per_week
        .map_or_else(|| "3 times a week".to_owned(), |n| format!("{n} times a week"));
    format!(
        "You are a personal fitness coach. Write 3 short, practical fitness and nutrition tips.\n\n\
         USER:\n- Level: {}\n- Goal: {}\n- Training frequency: {frequency}\n\n\
         RULES:\n- Return ONLY a numbered list:\n  1. First tip\n  2. Second tip\n  3. Third tip\n\
         - At most 10 words per tip\n- No other text",
        or(profile.level.as_deref(), "beginner"),
        or(profile.goal.as_deref(), "maintenance"),
    )
}

pub(crate) fn dish_nutrition(name: &str, grams: f64) -> String {
    format!(
        "You are a nutrition expert. Estimate the nutrition of a {grams} g portion.\n\n\
         DISH: {name}\nPORTION: {grams} g\n\n\
         RETURN ONLY JSON, NO OTHER TEXT:\n\
         {{\"calories\": number, \"protein\": number, \"fat\": number, \"carbs\": number}}"
    )
}

pub(crate) fn workout(profile: &CoachProfile, muscle_group: &str, history: &HistoryAnalysis) -> String {
    let age = profile.age.map_or_else(|| "not specified".to_owned(), |a| a.to_string());
    format!(
        "You are a personal fitness coach. Build a personalised workout.\n\n\
         USER:\n- Level: {}\n- Goal: {}\n- Gender: {}\n- Age: {age}\n- Muscle group: {muscle_group}\n\n\
         HISTORY:\n{}\n\
         RULES:\n- 3-4 exercises\n- Match the user's level and keep exercises safe\n\
         - Respect the history: avoid repeats, suggest progression\n\
         - Return JSON:\n\
         {{\"name\": \"Workout name\", \"description\": \"Short description\", \"exercises\": [\
         {{\"name\": \"Exercise\", \"muscle_group\": \"group\", \"sets\": 3, \"reps\": 10, \
         \"intensity\": \"low/medium/high\", \"reason\": \"why this exercise\"}}]}}\n\n\
         IMPORTANT: return ONLY JSON.",
        or(profile.level.as_deref(), "beginner"),
        or(profile.goal.as_deref(), "general fitness"),
        or(profile.gender.as_deref(), "not specified"),
        history.describe(muscle_group),
    )
}

pub(crate) fn greeting(profile: &CoachProfile, week: &DashboardSnapshot) -> String {
    format!(
        "You are a personal fitness coach. Write a short motivating dashboard greeting.\n\n\
         USER:\n- Name: {}\n- Level: {}\n- Goal: {}\n\n\
         THIS WEEK:\n- Planned workouts: {}\n- Completed workouts: {}\n- Completion: {}%\n\
         - Weight lifted: {} kg\n- Recovery: {}%\n\n\
         RULES: 1-2 sentences, use the name, highlight the main achievement, add one piece of \
         motivation. Plain text only, no quotes.",
        profile.name,
        or(profile.level.as_deref(), "beginner"),
        or(profile.goal.as_deref(), "general fitness"),
        week.planned_workouts,
        week.completed_workouts,
        week.completion_rate,
        week.total_weight_lifted,
        week.recovery_score,
    )
}

pub(crate) fn progress(
    profile: &CoachProfile,
    metric: &str,
    points: &[ChartPoint],
    trend: Option<&str>,
) -> String {
    let recent = points[points.len().saturating_sub(5)..]
        .iter()
        .map(|p| format!("{}: {} ({})", p.date, p.value, p.label))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a personal fitness coach. Analyse the user's progress briefly.\n\n\
         USER:\n- Name: {}\n- Level: {}\n- Goal: {}\n- Metric: {metric}\n\n\
         PROGRESS ({} records):\n{}\n\nLAST 5 RECORDS:\n{recent}\n\n\
         RULES: 2-3 sentences, describe the trend, give one concrete recommendation, stay positive.",
        profile.name,
        or(profile.level.as_deref(), "beginner"),
        or(profile.goal.as_deref(), "not specified"),
        points.len(),
        trend.unwrap_or_default(),
    )
}
