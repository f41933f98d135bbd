//! Config loading and defaults integration tests

use std::io::Write;

use kafka_ui_sessions::{Config, ConsumerError, RECORD_MEDIA_TYPE_V1};

#[test]
fn test_config_with_all_fields() {
    let toml_str = r#"
[proxy]
base_url = "http://rest-proxy:8082"
group_prefix = "ops-ui"
record_media_type = "application/vnd.kafka.v2+json"
timeout_secs = 30

[buffer]
max_records_per_topic = 500
"#;

    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.proxy.base_url, "http://rest-proxy:8082");
    assert_eq!(config.proxy.group_prefix, "ops-ui");
    assert_eq!(config.proxy.record_media_type, "application/vnd.kafka.v2+json");
    assert_eq!(config.proxy.timeout_secs, Some(30));
    assert_eq!(config.buffer.max_records_per_topic, Some(500));
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config = Config::from_toml_str("[proxy]\nbase_url = \"http://other:8082\"\n").unwrap();
    assert_eq!(config.proxy.base_url, "http://other:8082");
    assert_eq!(config.proxy.group_prefix, "kafka-ui");
    assert_eq!(config.proxy.record_media_type, RECORD_MEDIA_TYPE_V1);
    assert_eq!(config.buffer.max_records_per_topic, None);
}

#[test]
fn test_invalid_toml() {
    let err = Config::from_toml_str("[proxy\nbase_url = 1").unwrap_err();
    assert!(matches!(err, ConsumerError::Config(_)));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[buffer]\nmax_records_per_topic = 10").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.buffer.max_records_per_topic, Some(10));
}

#[test]
fn test_load_missing_file() {
    let err = Config::load("/nonexistent/kafka-ui.toml").unwrap_err();
    assert!(matches!(err, ConsumerError::Config(_)));
}
