// Configuration loading through the public API

use std::io::Write;

use clearmark::config::*;
use clearmark::error::ConfigError;

#[test]
fn test_can_deserialize_full_yaml_config() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
  threads: 2
  max_upload_bytes: 5242880
api:
  base_url: "https://api.example.test"
  origin: "https://example.test"
  timeout_secs: 20
polling:
  max_attempts: 10
  interval_ms: 500
  transport_retries: 2
relay:
  default_content_type: "image/webp"
staging:
  dir: "/var/tmp/clearmark"
logging:
  level: "debug"
  format: pretty
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to parse config");

    assert_eq!(config.server.listen_addr(), "127.0.0.1:8080");
    assert_eq!(config.server.threads, 2);
    assert_eq!(config.server.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(config.api.base_url, "https://api.example.test");
    assert_eq!(config.api.origin, "https://example.test");
    assert_eq!(config.api.user_agent, "Mozilla/5.0");
    assert_eq!(config.api.timeout_secs, Some(20));
    assert_eq!(config.relay.default_content_type, "image/webp");
    assert_eq!(
        config.staging.dir.as_deref(),
        Some(std::path::Path::new("/var/tmp/clearmark"))
    );
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);

    let policy = config.polling.to_poll_policy();
    assert_eq!(policy.max_attempts, 10);
    assert_eq!(policy.interval, std::time::Duration::from_millis(500));
    assert_eq!(policy.transport_retries, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let yaml = r#"
server:
  port: 9000
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();

    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.api.base_url, "https://api.ezremove.ai");
    assert_eq!(config.polling.max_attempts, 15);
    assert_eq!(config.polling.interval_ms, 2000);
    assert_eq!(config.polling.transport_retries, 0);
    assert_eq!(config.relay.default_content_type, "image/png");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_env_var_substitution() {
    std::env::set_var("CLEARMARK_TEST_API_BASE", "https://staging.api.test");
    let yaml = r#"
api:
  base_url: "${CLEARMARK_TEST_API_BASE}"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.api.base_url, "https://staging.api.test");
}

#[test]
fn test_missing_env_var_is_an_error() {
    std::env::remove_var("CLEARMARK_TEST_UNSET_VAR");
    let yaml = r#"
api:
  origin: "${CLEARMARK_TEST_UNSET_VAR}"
"#;
    match Config::from_yaml_with_env(yaml) {
        Err(ConfigError::MissingEnvVar(name)) => assert_eq!(name, "CLEARMARK_TEST_UNSET_VAR"),
        other => panic!("expected MissingEnvVar, got {:?}", other),
    }
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    let result = Config::from_yaml_with_env("server: [unclosed");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server:\n  port: 4567\npolling:\n  max_attempts: 4").unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.port, 4567);
    assert_eq!(config.polling.max_attempts, 4);
}

#[test]
fn test_from_missing_file_is_read_error() {
    let result = Config::from_file("/nonexistent/clearmark/config.yaml");
    assert!(matches!(result, Err(ConfigError::Read(_))));
}

#[test]
fn test_zero_upload_limit_fails_validation() {
    let config = Config::from_yaml_with_env("server:\n  max_upload_bytes: 0\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_upload_bytes"));
}
