use trai_database::Database;
use trai_domain::enums::ProgressMetric;
use trai_progress::{MIGRATIONS, ProgressLog, ProgressRecord, chart_points};

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("in-memory database")
}

fn weigh_in(key: &str, user: &str, at: &str, weight: f64) -> ProgressRecord {
    ProgressRecord {
        key: key.into(),
        user_id: user.into(),
        weight: Some(weight),
        notes: Some("morning".into()),
        photo: None,
        total_lifted_weight: 0.0,
        recovery_score: 0.0,
        completed_workouts: 0,
        recorded_at: at.into(),
    }
}

#[tokio::test]
async fn list_is_newest_first_and_per_user() {
    let db = db("progress_list").await;
    ProgressLog::record(&db, weigh_in("p1", "u1", "2026-03-01T08:00:00Z", 80.0)).await.unwrap();
    ProgressLog::record(&db, weigh_in("p2", "u1", "2026-03-05T08:00:00Z", 79.2)).await.unwrap();
    ProgressLog::record(&db, weigh_in("p3", "u2", "2026-03-02T08:00:00Z", 60.0)).await.unwrap();

    let entries = ProgressLog::list(&db, "u1").await.unwrap();
    let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["p2", "p1"]);
    assert_eq!(entries[0].notes.as_deref(), Some("morning"));

    let points = chart_points(&entries, ProgressMetric::Weight);
    assert_eq!(points.first().map(|p| p.date.as_str()), Some("2026-03-01"));
}

#[tokio::test]
async fn workout_entries_feed_the_workouts_series() {
    let db = db("progress_workouts").await;
    let entry = ProgressRecord::workout("w1".into(), "u1".into(), 1200.0, 75.0, "2026-03-03T18:00:00Z".into());
    ProgressLog::record(&db, entry).await.unwrap();

    let entries = ProgressLog::list(&db, "u1").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].weight.is_none());
    assert_eq!(chart_points(&entries, ProgressMetric::Workouts).len(), 1);
    assert!(chart_points(&entries, ProgressMetric::Weight).is_empty());
}

#[tokio::test]
async fn between_is_half_open() {
    let db = db("progress_between").await;
    ProgressLog::record(&db, weigh_in("a", "u1", "2026-03-01T00:00:00Z", 80.0)).await.unwrap();
    ProgressLog::record(&db, weigh_in("b", "u1", "2026-03-02T12:00:00Z", 80.0)).await.unwrap();
    ProgressLog::record(&db, weigh_in("c", "u1", "2026-03-03T00:00:00Z", 80.0)).await.unwrap();

    let range = ProgressLog::between(&db, "u1", "2026-03-01T00:00:00Z", "2026-03-03T00:00:00Z").await.unwrap();
    let keys: Vec<_> = range.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["a", "b"]);
}
