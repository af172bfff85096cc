use chrono::{TimeZone, Utc};
use trai_database::Database;
use trai_identity::{UserPatch, UserRecord, Users};
use trai_workouts::{AiQuota, AiUsage};

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(trai_identity::MIGRATIONS.iter().chain(trai_workouts::MIGRATIONS).copied())
        .init()
        .await
        .expect("in-memory database")
}

async fn user(db: &Database, key: &str) -> UserRecord {
    let user = UserRecord::new(
        key.into(),
        "Anna".into(),
        format!("{key}@example.com"),
        "hash".into(),
        "2026-01-01T00:00:00Z".into(),
    );
    Users::create(db, user.clone()).await.unwrap();
    user
}

#[tokio::test]
async fn fourth_claim_in_a_month_is_refused() {
    let db = db("quota_claim").await;
    user(&db, "u1").await;
    let march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    for _ in 0..3 {
        assert!(AiQuota::claim(&db, "u1", false, march).await.unwrap());
    }
    assert!(!AiQuota::claim(&db, "u1", false, march).await.unwrap());

    let stored = Users::find(&db, "u1").await.unwrap().expect("user");
    assert_eq!(stored.ai_generations_used, 3);
    assert!(AiUsage::of(&stored, march).exhausted());

    let april = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    assert!(AiQuota::claim(&db, "u1", false, april).await.unwrap());
    let stored = Users::find(&db, "u1").await.unwrap().expect("user");
    assert_eq!(stored.ai_generations_used, 1);
    assert_eq!(stored.ai_generations_reset_at.as_deref(), Some("2026-04-01T00:00:00Z"));
}

#[tokio::test]
async fn released_claim_can_be_taken_again() {
    let db = db("quota_release").await;
    user(&db, "u1").await;
    let march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    for _ in 0..3 {
        assert!(AiQuota::claim(&db, "u1", false, march).await.unwrap());
    }
    AiQuota::release(&db, "u1").await.unwrap();
    assert!(AiQuota::claim(&db, "u1", false, march).await.unwrap());
    assert!(!AiQuota::claim(&db, "u1", false, march).await.unwrap());

    Users::update(&db, "u1", UserPatch::new().int("ai_generations_used", 0)).await.unwrap();
    AiQuota::release(&db, "u1").await.unwrap();
    let stored = Users::find(&db, "u1").await.unwrap().expect("user");
    assert_eq!(stored.ai_generations_used, 0);
}

#[tokio::test]
async fn unlimited_roles_always_claim() {
    let db = db("quota_unlimited").await;
    user(&db, "u1").await;
    let march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    for _ in 0..5 {
        assert!(AiQuota::claim(&db, "u1", true, march).await.unwrap());
    }
    let stored = Users::find(&db, "u1").await.unwrap().expect("user");
    assert_eq!(stored.ai_generations_used, 5);
    assert!(!AiQuota::claim(&db, "ghost", true, march).await.unwrap());
}
