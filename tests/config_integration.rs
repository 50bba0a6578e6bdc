use renewhire_portal::config::{AppConfig, SessionBackend};
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;

const BIN: &str = "renewhire-portal";

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        for key in [
            "RENEWHIRE_SERVER__PORT",
            "RENEWHIRE_API__BASE_URL",
            "RENEWHIRE_API__TIMEOUT_SECS",
            "RENEWHIRE_SESSION__STORAGE",
            "CONFIG_FILE",
            "PORT",
            "API_BASE_URL",
            "API_TIMEOUT_SECS",
            "SESSION_PATH",
        ] {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args([BIN]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.api.base_url, "http://localhost:5000");
    assert_eq!(config.api.timeout(), Duration::from_secs(15));
    assert_eq!(config.session.storage, SessionBackend::File);
    assert_eq!(config.session.path, "renewhire-session.json");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("RENEWHIRE_SERVER__PORT", "9090");
        env::set_var("RENEWHIRE_API__BASE_URL", "https://api.renewhire.test");
        env::set_var("RENEWHIRE_SESSION__STORAGE", "memory");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.api.base_url, "https://api.renewhire.test");
    assert_eq!(config.session.storage, SessionBackend::Memory);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("RENEWHIRE_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args([
        BIN,
        "--port",
        "4040",
        "--api-timeout-secs",
        "3",
        "--session-path",
        "/tmp/rh.json",
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 4040);
    assert_eq!(config.api.timeout_secs, 3);
    assert_eq!(config.session.path, "/tmp/rh.json");

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("portal.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
api:
  base_url: "http://backend.internal:8080"
"#,
    )
    .expect("Failed to write temp config");

    let path = file_path.to_string_lossy().to_string();
    let config = AppConfig::load_from_args([BIN, "--config", path.as_str()])
        .expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.api.base_url, "http://backend.internal:8080");
    // Untouched keys keep their defaults.
    assert_eq!(config.api.timeout_secs, 15);
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    clear_env_vars();

    let result = AppConfig::load_from_args([BIN, "--api-timeout-secs", "0"]);
    assert!(result.is_err());
}
