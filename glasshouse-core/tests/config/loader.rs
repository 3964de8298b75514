use std::fs;

use glasshouse_core::config::load_from_path;

use crate::helpers::{create_valid_test_cert, tmp_path};

#[test]
fn loads_minimal_config_with_defaults() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (cert_path, key_path) = create_valid_test_cert()?;
    let config_path = tmp_path("minimal.json");
    let json = format!(
        r#"{{"cert_file": "{}", "key_file": "{}"}}"#,
        cert_path.display(),
        key_path.display()
    );
    fs::write(&config_path, json)?;

    let cfg = load_from_path(&config_path)?;
    assert_eq!(cfg.tls_port, "443");
    assert_eq!(cfg.http_port, "80");
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.cors_key, "x-api-key");
    assert!(!cfg.log_to_db);
    Ok(())
}

#[test]
fn loads_full_config_with_analytics_and_telemetry(
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (cert_path, key_path) = create_valid_test_cert()?;
    let config_path = tmp_path("full.json");
    let json = format!(
        r#"{{
  "tls_port": "8443",
  "http_port": "8080",
  "host": "127.0.0.1",
  "cert_file": "{}",
  "key_file": "{}",
  "http_redirect": "https://example.test",
  "log_to_db": true,
  "mongo_url": "mongodb://localhost:27017",
  "mongo_database": "glasshouse",
  "mongo_collection": "fingerprints",
  "mongo_log_ips": true,
  "cors_key": "x-debug-key",
  "logging": {{ "level": "debug", "show_target": true }},
  "telemetry": {{ "metrics_port": 9100 }}
}}"#,
        cert_path.display(),
        key_path.display()
    );
    fs::write(&config_path, json)?;

    let cfg = load_from_path(&config_path)?;
    assert_eq!(cfg.tls_port, "8443");
    assert_eq!(cfg.host, "127.0.0.1");
    assert!(cfg.log_to_db);
    assert_eq!(cfg.analytics.mongo_database.as_deref(), Some("glasshouse"));
    assert!(cfg.analytics.mongo_log_ips);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.telemetry.metrics_port, Some(9100));
    Ok(())
}

#[test]
fn rejects_missing_key_file() {
    let (cert_path, _key_path) = create_valid_test_cert().expect("cert");
    let config_path = tmp_path("missing_key.json");
    let json = format!(
        r#"{{"cert_file": "{}", "key_file": "/nonexistent/key.pem"}}"#,
        cert_path.display()
    );
    fs::write(&config_path, json).expect("write config");

    assert!(load_from_path(&config_path).is_err());
}

#[test]
fn rejects_log_to_db_without_mongo_fields() {
    let (cert_path, key_path) = create_valid_test_cert().expect("cert");
    let config_path = tmp_path("no_mongo.json");
    let json = format!(
        r#"{{"cert_file": "{}", "key_file": "{}", "log_to_db": true}}"#,
        cert_path.display(),
        key_path.display()
    );
    fs::write(&config_path, json).expect("write config");

    assert!(load_from_path(&config_path).is_err());
}
