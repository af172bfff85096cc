use trai_database::Database;
use trai_profile::{MIGRATIONS, RecommendationRecord, Recommendations, TIP};

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("in-memory database")
}

fn tip(key: &str, user: &str, at: &str) -> RecommendationRecord {
    RecommendationRecord {
        key: key.into(),
        user_id: user.into(),
        kind: TIP.into(),
        message: format!("tip {key}"),
        created_at: at.into(),
    }
}

#[tokio::test]
async fn latest_is_newest_first_and_limited() {
    let db = db("profile_facts").await;
    let batch = (1..=7).map(|i| tip(&format!("r{i}"), "u1", &format!("2026-10-0{i}T08:00:00Z"))).collect();
    Recommendations::store(&db, batch).await.unwrap();
    Recommendations::store(&db, vec![tip("other", "u2", "2026-10-09T08:00:00Z")]).await.unwrap();

    let facts = Recommendations::latest(&db, "u1", 5).await.unwrap();
    let keys: Vec<_> = facts.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, ["r7", "r6", "r5", "r4", "r3"]);
    assert_eq!(facts[0].message, "tip r7");
}

#[tokio::test]
async fn storing_nothing_is_a_no_op() {
    let db = db("profile_empty").await;
    Recommendations::store(&db, Vec::new()).await.unwrap();
    assert!(Recommendations::latest(&db, "u1", 5).await.unwrap().is_empty());
}
