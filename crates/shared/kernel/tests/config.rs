use std::io::Write;
use trai_kernel::config::load_config;
use trai_kernel::domain::config::ApiConfig;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg: ApiConfig = load_config(Some(dir.path().join("absent"))).unwrap();
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.database.url, "mem://");
}

#[test]
fn toml_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[server]
port = 9100

[security]
bcrypt_cost = 4

[storage]
static_dir = "/srv/static"
"#
    )
    .unwrap();

    let cfg: ApiConfig = load_config(Some(dir.path().join("server"))).unwrap();
    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.security.bcrypt_cost, 4);
    assert_eq!(cfg.security.access_ttl_minutes, 15);
    assert_eq!(cfg.storage.static_dir, std::path::PathBuf::from("/srv/static"));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(load_config::<ApiConfig>(Some(&path)).is_err());
}
