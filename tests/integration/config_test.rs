//! Configuration loading from the process environment
//!
//! These tests mutate process-wide environment variables, so they run
//! serially.

use serial_test::serial;
use std::path::PathBuf;
use std::time::Duration;

use task_social::shared::config::CONFIG_FILE_ENV;
use task_social::shared::{AppConfig, ClubScope, ConfigError};

const KEYS: &[&str] = &[
    CONFIG_FILE_ENV,
    "PORT",
    "DATABASE_URL",
    "JWT_SECRET_KEY",
    "SWEEP_INTERVAL_SECS",
    "SCHEDULER_INTERVAL_SECS",
    "WRITE_TIMEOUT_MS",
    "OUTBOUND_BUFFER",
    "CLUB_SCOPE",
    "NOTIFY_ROLLOVERS",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

fn write_config_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("task-social-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config, AppConfig::default());
    assert!(config.uses_default_secret());
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    std::env::set_var("PORT", "7070");
    std::env::set_var("JWT_SECRET_KEY", "from-env");
    std::env::set_var("CLUB_SCOPE", "ALL");
    std::env::set_var("WRITE_TIMEOUT_MS", "250");

    let config = AppConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.port, 7070);
    assert_eq!(config.jwt_secret, "from-env");
    assert_eq!(config.club_scope, ClubScope::All);
    assert_eq!(config.write_timeout, Duration::from_millis(250));
    assert!(!config.uses_default_secret());
}

#[test]
#[serial]
fn test_environment_wins_over_config_file() {
    clear_env();
    let path = write_config_file(
        r#"
port = 6000
sweep_interval_secs = 10
club_scope = "all"
notify_rollovers = false
"#,
    );
    std::env::set_var(CONFIG_FILE_ENV, &path);
    std::env::set_var("PORT", "6001");

    let result = AppConfig::from_env();
    clear_env();
    std::fs::remove_file(&path).unwrap();

    let config = result.unwrap();
    assert_eq!(config.port, 6001);
    assert_eq!(config.sweep_interval, Duration::from_secs(10));
    assert_eq!(config.club_scope, ClubScope::All);
    assert!(!config.notify_rollovers);
}

#[test]
#[serial]
fn test_unparseable_environment_value_is_an_error() {
    clear_env();
    std::env::set_var("PORT", "eighty");

    let result = AppConfig::from_env();
    clear_env();

    assert!(matches!(result, Err(ConfigError::InvalidValue { key: "PORT", .. })));
}

#[test]
#[serial]
fn test_unknown_club_scope_is_an_error() {
    clear_env();
    std::env::set_var("CLUB_SCOPE", "private");

    let result = AppConfig::from_env();
    clear_env();

    assert!(matches!(result, Err(ConfigError::InvalidValue { key: "CLUB_SCOPE", .. })));
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    clear_env();
    let path = std::env::temp_dir().join(format!("task-social-missing-{}.toml", uuid::Uuid::new_v4()));
    std::env::set_var(CONFIG_FILE_ENV, &path);

    let result = AppConfig::from_env();
    clear_env();

    assert!(matches!(result, Err(ConfigError::Read { .. })));
}
