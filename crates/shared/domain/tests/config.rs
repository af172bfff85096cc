use trai_domain::config::{
    AiConfig, ApiConfig, DatabaseConfig, SecurityConfig, ServerConfig, StorageConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8000);
    assert!(server.address.is_unspecified());
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "trai");
    assert_eq!(db.database, "core");
    assert!(db.credentials.is_none());

    let security = SecurityConfig::default();
    assert_eq!(security.access_ttl_minutes, 15);
    assert_eq!(security.refresh_ttl_days, 7);
    assert_ne!(security.access_secret, security.refresh_secret);

    let storage = StorageConfig::default();
    assert_eq!(storage.static_dir, std::path::PathBuf::from("static"));
    assert_eq!(storage.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(storage.presign_ttl_secs, 3600);

    let ai = AiConfig::default();
    assert!(ai.api_key.is_none());
    assert_eq!(ai.model, "llama-3.3-70b-versatile");
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "mem://", "namespace": "n", "database": "d", "credentials": null },
        "storage": {
            "data_dir": "/tmp/data",
            "static_dir": "/tmp/static",
            "s3": { "endpoint": "http://minio:9000", "bucket": "b" }
        },
        "ai": { "api_key": "gsk_test" }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.storage.static_dir, std::path::PathBuf::from("/tmp/static"));
    assert_eq!(cfg.storage.max_upload_bytes, 10 * 1024 * 1024);

    let s3 = cfg.storage.s3.as_ref().expect("s3 section");
    assert_eq!(s3.bucket, "b");
    assert_eq!(s3.region, "us-east-1");
    assert_eq!(cfg.ai.api_key.as_deref(), Some("gsk_test"));
    assert!(cfg.food.enabled);
}

#[test]
fn config_is_copy_on_write() {
    let base = ApiConfig::default();
    let mut tweaked = base.clone();
    tweaked.server.port = 9000;

    assert_eq!(base.server.port, 8000);
    assert_eq!(tweaked.server.port, 9000);
}
