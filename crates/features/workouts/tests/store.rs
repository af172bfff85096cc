use trai_database::Database;
use trai_workouts::{ExerciseRecord, MIGRATIONS, WorkoutRecord, WorkoutStore, WorkoutTestRecord};

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("in-memory database")
}

fn workout(key: &str, user: &str, scheduled_at: &str) -> WorkoutRecord {
    WorkoutRecord {
        key: key.into(),
        user_id: user.into(),
        name: "Push day".into(),
        muscle_group: "upper_body_push".into(),
        scheduled_at: scheduled_at.into(),
        completed: false,
        completed_at: None,
        ai_generated: false,
        difficulty: None,
        total_weight_lifted: 0.0,
        exercises: vec![ExerciseRecord {
            name: "Bench press".into(),
            muscle_group: "chest".into(),
            sets: 3,
            reps: 10,
            weight: 60.0,
            intensity: Some("medium".into()),
        }],
    }
}

#[tokio::test]
async fn list_is_newest_first_and_keeps_exercises() {
    let db = db("workouts_list").await;
    WorkoutStore::create(&db, workout("w1", "u1", "2026-03-01T10:00:00Z")).await.unwrap();
    WorkoutStore::create(&db, workout("w2", "u1", "2026-03-04T10:00:00Z")).await.unwrap();
    WorkoutStore::create(&db, workout("w3", "u2", "2026-03-05T10:00:00Z")).await.unwrap();

    let list = WorkoutStore::list(&db, "u1").await.unwrap();
    let keys: Vec<_> = list.iter().map(|w| w.key.as_str()).collect();
    assert_eq!(keys, ["w2", "w1"]);
    assert_eq!(list[0].exercises[0].intensity.as_deref(), Some("medium"));

    let recent = WorkoutStore::recent(&db, "u1", 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].key, "w2");
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let db = db("workouts_delete").await;
    WorkoutStore::create(&db, workout("w1", "u1", "2026-03-01T10:00:00Z")).await.unwrap();

    assert!(!WorkoutStore::delete_owned(&db, "u2", "w1").await.unwrap());
    assert!(WorkoutStore::find_owned(&db, "u1", "w1").await.unwrap().is_some());
    assert!(WorkoutStore::delete_owned(&db, "u1", "w1").await.unwrap());
    assert!(WorkoutStore::find_owned(&db, "u1", "w1").await.unwrap().is_none());
    assert!(!WorkoutStore::delete_owned(&db, "u1", "w1").await.unwrap());
}

#[tokio::test]
async fn completion_marks_the_workout() {
    let db = db("workouts_complete").await;
    let w = workout("w1", "u1", "2026-03-01T10:00:00Z");
    let total = w.total_volume();
    WorkoutStore::create(&db, w).await.unwrap();

    let test = WorkoutTestRecord::new("t1".into(), "u1".into(), "w1".into(), [8; 8], "2026-03-01T11:00:00Z".into());
    assert!(WorkoutStore::complete(&db, test, total).await.unwrap());

    let stored = WorkoutStore::find_owned(&db, "u1", "w1").await.unwrap().expect("workout");
    assert!(stored.completed);
    assert_eq!(stored.completed_at.as_deref(), Some("2026-03-01T11:00:00Z"));
    assert!((stored.total_weight_lifted - 1800.0).abs() < f64::EPSILON);

    let done = WorkoutStore::completed_between(&db, "u1", "2026-03-01T00:00:00Z", "2026-03-02T00:00:00Z")
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    let none = WorkoutStore::completed_between(&db, "u1", "2026-03-02T00:00:00Z", "2026-03-03T00:00:00Z")
        .await
        .unwrap();
    assert!(none.is_empty());

    let tests = WorkoutStore::recent_tests(&db, "u1", 7).await.unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].energy_level, 8);
    assert!(WorkoutStore::recent_tests(&db, "u2", 7).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_completion_changes_nothing() {
    let db = db("workouts_complete_twice").await;
    let w = workout("w1", "u1", "2026-03-01T10:00:00Z");
    let total = w.total_volume();
    WorkoutStore::create(&db, w).await.unwrap();

    let first = WorkoutTestRecord::new("t1".into(), "u1".into(), "w1".into(), [8; 8], "2026-03-01T11:00:00Z".into());
    let second = WorkoutTestRecord::new("t2".into(), "u1".into(), "w1".into(), [2; 8], "2026-03-01T12:00:00Z".into());
    assert!(WorkoutStore::complete(&db, first, total).await.unwrap());
    assert!(!WorkoutStore::complete(&db, second, total).await.unwrap());

    let stored = WorkoutStore::find_owned(&db, "u1", "w1").await.unwrap().expect("workout");
    assert_eq!(stored.completed_at.as_deref(), Some("2026-03-01T11:00:00Z"));
    let tests = WorkoutStore::recent_tests(&db, "u1", 7).await.unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].key, "t1");
}

#[tokio::test]
async fn completion_of_a_foreign_workout_stores_nothing() {
    let db = db("workouts_complete_foreign").await;
    WorkoutStore::create(&db, workout("w1", "u1", "2026-03-01T10:00:00Z")).await.unwrap();

    let test = WorkoutTestRecord::new("t1".into(), "u2".into(), "w1".into(), [5; 8], "2026-03-01T11:00:00Z".into());
    assert!(!WorkoutStore::complete(&db, test, 0.0).await.unwrap());
    assert!(WorkoutStore::recent_tests(&db, "u2", 7).await.unwrap().is_empty());
}
