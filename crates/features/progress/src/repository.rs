use surrealdb_types::SurrealValue;
use trai_ai::ChartPoint;
use trai_database::{Database, DatabaseError, DatabaseErrorExt};
use trai_domain::enums::ProgressMetric;

/// One row of the `progress` table.
#[derive(Debug, Clone, PartialEq, SurrealValue)]
#[surreal(crate = "::surrealdb_types")]
pub struct ProgressRecord {
    pub key: String,
    pub user_id: String,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub total_lifted_weight: f64,
    pub recovery_score: f64,
    pub completed_workouts: i64,
    pub recorded_at: String,
}

impl ProgressRecord {
    /// An entry written after a finished workout.
    #[must_use]
    pub fn workout(
        key: String,
        user_id: String,
        total_lifted_weight: f64,
        recovery_score: f64,
        recorded_at: String,
    ) -> Self {
        Self {
            key,
            user_id,
            weight: None,
            notes: None,
            photo: None,
            total_lifted_weight,
            recovery_score,
            completed_workouts: 1,
            recorded_at,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressLog;

impl ProgressLog {
    /// # Errors
    /// Storage failures.
    pub async fn record(db: &Database, entry: ProgressRecord) -> Result<(), DatabaseError> {
        db.query("CREATE progress CONTENT $entry RETURN NONE")
            .bind(("entry", entry))
            .await
            .context("Recording progress")?
            .check()
            .context("Recording progress")?;
        Ok(())
    }

    /// The user's entries, newest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn list(db: &Database, user_id: &str) -> Result<Vec<ProgressRecord>, DatabaseError> {
        let entries: Vec<ProgressRecord> = db
            .query("SELECT * OMIT id FROM progress WHERE user_id = $user ORDER BY recorded_at DESC")
            .bind(("user", user_id.to_owned()))
            .await
            .context("Listing progress")?
            .take(0)
            .context("Decoding progress")?;
        Ok(entries)
    }

    /// Entries recorded in `[from, to)`, oldest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn between(
        db: &Database,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<ProgressRecord>, DatabaseError> {
        let entries: Vec<ProgressRecord> = db
            .query(
                "SELECT * OMIT id FROM progress \
                 WHERE user_id = $user AND recorded_at >= $from AND recorded_at < $to \
                 ORDER BY recorded_at ASC",
            )
            .bind(("user", user_id.to_owned()))
            .bind(("from", from.to_owned()))
            .bind(("to", to.to_owned()))
            .await
            .context("Loading progress range")?
            .take(0)
            .context("Decoding progress")?;
        Ok(entries)
    }
}

/// Chart series for `metric`, oldest first.
///
/// `entries` may come in any order. Weight skips entries without a weight, and
/// recovery skips entries that carry no score.
#[must_use]
pub fn chart_points(entries: &[ProgressRecord], metric: ProgressMetric) -> Vec<ChartPoint> {
    let mut sorted: Vec<&ProgressRecord> = entries.iter().collect();
    sorted.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));

    sorted
        .into_iter()
        .filter_map(|entry| {
            let (value, label) = match metric {
                ProgressMetric::Weight => (entry.weight?, "kg"),
                #[allow(clippy::cast_precision_loss)]
                ProgressMetric::Workouts => (entry.completed_workouts as f64, "workouts"),
                ProgressMetric::Recovery if entry.recovery_score > 0.0 => (entry.recovery_score, "%"),
                ProgressMetric::Recovery => return None,
            };
            Some(ChartPoint { date: day_of(&entry.recorded_at), value, label: label.to_owned() })
        })
        .collect()
}

fn day_of(stamp: &str) -> String {
    stamp.get(..10).unwrap_or(stamp).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(at: &str, weight: Option<f64>, workouts: i64, recovery: f64) -> ProgressRecord {
        ProgressRecord {
            key: at.to_owned(),
            user_id: "u1".to_owned(),
            weight,
            notes: None,
            photo: None,
            total_lifted_weight: 0.0,
            recovery_score: recovery,
            completed_workouts: workouts,
            recorded_at: at.to_owned(),
        }
    }

    #[test]
    fn points_are_oldest_first() {
        let entries = [
            entry("2026-03-03T08:00:00Z", Some(79.0), 0, 0.0),
            entry("2026-03-01T08:00:00Z", Some(80.0), 0, 0.0),
        ];
        let points = chart_points(&entries, ProgressMetric::Weight);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2026-03-01");
        assert!((points[0].value - 80.0).abs() < f64::EPSILON);
        assert_eq!(points[1].label, "kg");
    }

    #[test]
    fn weight_skips_missing_values() {
        let entries = [entry("2026-03-01T08:00:00Z", None, 1, 70.0)];
        assert!(chart_points(&entries, ProgressMetric::Weight).is_empty());
        assert_eq!(chart_points(&entries, ProgressMetric::Workouts).len(), 1);
        assert_eq!(chart_points(&entries, ProgressMetric::Recovery).len(), 1);
    }

    #[test]
    fn recovery_skips_unscored_entries() {
        let entries = [entry("2026-03-01T08:00:00Z", Some(80.0), 0, 0.0)];
        assert!(chart_points(&entries, ProgressMetric::Recovery).is_empty());
    }
}
