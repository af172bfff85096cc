use trai_domain::config::SecurityConfig;
use trai_identity::{Identity, IdentityError, init};

#[test]
fn init_creates_slice() {
    let slice = init(&SecurityConfig::default()).expect("init should succeed");
    assert!(slice.is::<Identity>());
    assert_eq!(slice.name(), "identity");
    assert_eq!(slice.downcast::<Identity>().map(|identity| identity.bcrypt_cost), Some(SecurityConfig::default().bcrypt_cost));
}

#[test]
fn shared_secrets_are_rejected() {
    let security = SecurityConfig {
        refresh_secret: SecurityConfig::default().access_secret,
        ..SecurityConfig::default()
    };
    assert!(matches!(init(&security), Err(IdentityError::Config { .. })));
}

#[test]
fn bcrypt_cost_is_bounded() {
    let security = SecurityConfig { bcrypt_cost: 3, ..SecurityConfig::default() };
    assert!(init(&security).is_err());
}
