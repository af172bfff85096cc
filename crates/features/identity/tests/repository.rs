use trai_database::Database;
use trai_domain::enums::Role;
use trai_identity::{MIGRATIONS, UserPatch, UserRecord, Users};

async fn db(ns: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session(ns, "core")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("in-memory database")
}

fn account(key: &str, email: &str) -> UserRecord {
    UserRecord::new(key.into(), "Anna".into(), email.into(), "hash".into(), "2026-01-01T00:00:00Z".into())
}

#[tokio::test]
async fn create_and_find() {
    let db = db("users_find").await;
    Users::create(&db, account("k1", "anna@example.com")).await.unwrap();

    let by_key = Users::find(&db, "k1").await.unwrap().expect("by key");
    assert_eq!(by_key.email, "anna@example.com");
    assert_eq!(by_key.role(), Role::User);
    assert!(by_key.age.is_none());

    let by_email = Users::find_by_email(&db, " Anna@Example.com ").await.unwrap();
    assert_eq!(by_email.map(|u| u.key), Some("k1".to_owned()));
    assert!(Users::find(&db, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn email_is_unique() {
    let db = db("users_unique").await;
    Users::create(&db, account("k1", "anna@example.com")).await.unwrap();
    assert!(Users::create(&db, account("k2", "anna@example.com")).await.is_err());
}

#[tokio::test]
async fn racing_sign_ups_keep_one_account() {
    let db = db("users_race").await;
    let (first, second) = tokio::join!(
        Users::create_unique(&db, account("k1", "sam@example.com")),
        Users::create_unique(&db, account("k2", "sam@example.com")),
    );
    let mut outcomes = [first.unwrap(), second.unwrap()];
    outcomes.sort_unstable();
    assert_eq!(outcomes, [false, true]);

    assert!(!Users::create_unique(&db, account("k3", "sam@example.com")).await.unwrap());
    assert!(Users::create_unique(&db, account("k4", "kim@example.com")).await.unwrap());
}

#[tokio::test]
async fn patch_sets_and_unsets_fields() {
    let db = db("users_patch").await;
    let mut user = account("k1", "anna@example.com");
    user.avatar = Some("/static/avatars/user_k1.png".into());
    Users::create(&db, user).await.unwrap();

    let patch = UserPatch::new().int("age", 30).float("weight", 72.5).flag("profile_completed", true).unset("avatar");
    let updated = Users::update(&db, "k1", patch).await.unwrap().expect("updated row");
    assert_eq!(updated.age, Some(30));
    assert_eq!(updated.weight, Some(72.5));
    assert!(updated.profile_completed);
    assert!(updated.avatar.is_none());

    let promoted = Users::set_role(&db, "k1", Role::Pro).await.unwrap().unwrap();
    assert_eq!(promoted.role(), Role::Pro);

    assert!(Users::update(&db, "ghost", UserPatch::new().int("age", 1)).await.unwrap().is_none());
}

#[tokio::test]
async fn refresh_tokens_store_and_revoke() {
    let db = db("users_refresh").await;
    let at = "2026-01-01T00:00:00Z".to_owned();
    Users::store_refresh_token(&db, "k1", "h1".into(), at.clone(), at.clone()).await.unwrap();
    Users::store_refresh_token(&db, "k1", "h2".into(), at.clone(), at.clone()).await.unwrap();

    let stored = Users::find_refresh_token(&db, "h1").await.unwrap().expect("stored");
    assert_eq!(stored.user_id, "k1");

    Users::delete_refresh_token(&db, "h1").await.unwrap();
    assert!(Users::find_refresh_token(&db, "h1").await.unwrap().is_none());

    Users::revoke_refresh_tokens(&db, "k1").await.unwrap();
    assert!(Users::find_refresh_token(&db, "h2").await.unwrap().is_none());
}
