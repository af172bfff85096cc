use std::sync::Arc;
use std::time::Duration;
use trai_attachments::{AttachmentRecord, AttachmentStore, MIGRATIONS, object_store, purge_on_user_deleted};
use trai_database::Database;
use trai_domain::config::StorageConfig;
use trai_domain::events::UserDeleted;
use trai_event_bus::EventBus;

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("in-memory database")
}

fn local_config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig { static_dir: dir.path().to_path_buf(), s3: None, ..StorageConfig::default() }
}

fn record(key: &str, user: &str, entity_id: &str, at: &str) -> AttachmentRecord {
    AttachmentRecord {
        key: key.into(),
        user_id: user.into(),
        entity_type: "workout".into(),
        entity_id: entity_id.into(),
        filename: format!("{key}.png"),
        object_key: format!("{key}0000.png"),
        content_type: "image/png".into(),
        size: 3,
        created_at: at.into(),
    }
}

#[tokio::test]
async fn entity_listing_respects_the_owner_filter() {
    let db = db("attachments_list").await;
    AttachmentStore::create(&db, record("a1", "u1", "w1", "2026-03-01T08:00:00Z")).await.unwrap();
    AttachmentStore::create(&db, record("a2", "u2", "w1", "2026-03-02T08:00:00Z")).await.unwrap();
    AttachmentStore::create(&db, record("a3", "u1", "w2", "2026-03-03T08:00:00Z")).await.unwrap();

    let own = AttachmentStore::for_entity(&db, "workout", "w1", Some("u1")).await.unwrap();
    assert_eq!(own.iter().map(|a| a.key.as_str()).collect::<Vec<_>>(), ["a1"]);

    let all = AttachmentStore::for_entity(&db, "workout", "w1", None).await.unwrap();
    assert_eq!(all.iter().map(|a| a.key.as_str()).collect::<Vec<_>>(), ["a1", "a2"]);

    assert!(AttachmentStore::for_entity(&db, "progress", "w1", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_and_delete() {
    let db = db("attachments_delete").await;
    AttachmentStore::create(&db, record("a1", "u1", "w1", "2026-03-01T08:00:00Z")).await.unwrap();

    let found = AttachmentStore::find(&db, "a1").await.unwrap().expect("stored row");
    assert!(found.visible_to("u1", false));
    assert!(!found.visible_to("u2", false));
    assert!(found.visible_to("u2", true));

    AttachmentStore::delete(&db, "a1").await.unwrap();
    assert!(AttachmentStore::find(&db, "a1").await.unwrap().is_none());
}

#[tokio::test]
async fn local_store_serves_objects_from_static() {
    let dir = tempfile::tempdir().unwrap();
    let store = object_store(&local_config(&dir)).await.unwrap();
    assert_eq!(store.backend(), "local");

    store.put("0123abcd.pdf", b"%PDF", "application/pdf").await.unwrap();
    assert!(dir.path().join("objects/0123abcd.pdf").exists());

    let url = store.presigned_get("0123abcd.pdf", Duration::from_secs(3600)).await.unwrap();
    assert_eq!(url, "/static/objects/0123abcd.pdf");
}

#[tokio::test]
async fn deleted_accounts_lose_their_objects() {
    let dir = tempfile::tempdir().unwrap();
    let store = object_store(&local_config(&dir)).await.unwrap();
    store.put("keep.png", b"1", "image/png").await.unwrap();
    store.put("gone1.png", b"2", "image/png").await.unwrap();
    store.put("gone2.pdf", b"3", "application/pdf").await.unwrap();

    let events = EventBus::new();
    let _listener = purge_on_user_deleted(&events, Arc::clone(&store)).unwrap();
    events
        .publish(UserDeleted {
            user_id: "u1".into(),
            object_keys: vec!["gone1.png".into(), "gone2.pdf".into(), "already-missing.png".into()],
        })
        .unwrap();

    let objects = dir.path().join("objects");
    for _ in 0..50 {
        if !objects.join("gone1.png").exists() && !objects.join("gone2.pdf").exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!objects.join("gone1.png").exists());
    assert!(!objects.join("gone2.pdf").exists());
    assert!(objects.join("keep.png").exists());
}
