use trai_database::{Database, DatabaseError, Migration};

const PEOPLE_V1: Migration =
    Migration::new("people", "0001", "DEFINE TABLE person SCHEMALESS; CREATE person:one SET name = 'Ann';");
const PEOPLE_V2: Migration =
    Migration::new("people", "0002", "DEFINE FIELD IF NOT EXISTS name ON person TYPE string;");

async fn open(ns: &str) -> Database {
    Database::builder().url("mem://").session(ns, "core").init().await.expect("connect to mem://")
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = open("health").await;
    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "health");
    assert_eq!(db.database(), "core");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_apply_once_then_skip() {
    let db = open("migrate").await;

    let first = db.migrate(&[PEOPLE_V1, PEOPLE_V2]).await.expect("first run");
    assert_eq!(first.applied.len(), 2);
    assert!(first.skipped.is_empty());

    let second = db.migrate(&[PEOPLE_V1, PEOPLE_V2]).await.expect("second run");
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped.len(), 2);

    let mut res = db.query("SELECT VALUE name FROM person").await.expect("select");
    let names: Vec<String> = res.take(0).expect("names");
    assert_eq!(names, vec!["Ann".to_owned()]);
}

#[tokio::test]
async fn edited_migration_is_a_checksum_error() {
    let db = open("drift").await;
    db.migrate(&[PEOPLE_V1]).await.expect("apply");

    let edited = Migration::new("people", "0001", "DEFINE TABLE person SCHEMAFULL;");
    let err = db.migrate(&[edited]).await.expect_err("drift must fail");
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn failing_script_is_not_recorded() {
    let db = open("broken").await;
    let broken = Migration::new("broken", "0001", "THIS IS NOT SURQL;");
    assert!(db.migrate(&[broken]).await.is_err());

    let mut res = db
        .query("SELECT VALUE version FROM migration WHERE slice = 'broken'")
        .await
        .expect("select");
    let versions: Vec<String> = res.take(0).expect("versions");
    assert!(versions.is_empty());
}

#[tokio::test]
async fn builder_runs_migrations() {
    let db = Database::builder()
        .url("mem://")
        .session("builder", "core")
        .migrations([PEOPLE_V1])
        .init()
        .await
        .expect("init with migrations");

    let mut res = db.query("SELECT VALUE slice FROM migration").await.expect("select");
    let slices: Vec<String> = res.take(0).expect("slices");
    assert_eq!(slices, vec!["people".to_owned()]);
}
