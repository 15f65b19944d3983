//! Unit tests for configuration validation and derived settings.

use std::time::Duration;

use rdb_lifecycle::config::{ConfigError, DEFAULT_FALLBACK_ENGINE_VERSION};
use rdb_lifecycle::{RdbConfig, RetryPolicy};
use rstest::*;

#[fixture]
fn valid_config() -> RdbConfig {
    RdbConfig {
        secret_key: String::from("RDBSECRETKEYEXAMPLE"),
        region: String::from("fr-par"),
        api_url: String::from("https://rdb.example.test/v1"),
        fallback_engine_version: String::from(DEFAULT_FALLBACK_ENGINE_VERSION),
        poll_max_attempts: 60,
        poll_interval_secs: 30,
        master_password: Some(String::from("correct horse battery staple")),
    }
}

#[rstest]
fn config_validation_accepts_complete_config(valid_config: RdbConfig) {
    assert_eq!(valid_config.validate(), Ok(()));
}

#[rstest]
fn config_validation_rejects_missing_secret_with_actionable_error(valid_config: RdbConfig) {
    let cfg = RdbConfig {
        secret_key: String::from("   "),
        ..valid_config
    };

    let error = cfg.validate().expect_err("secret is required");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(
        message.contains("RDB_SECRET_KEY"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("rdb-lifecycle.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains("secret_key"),
        "error should mention TOML key: {message}"
    );
}

#[rstest]
#[case::region(|cfg: &mut RdbConfig| cfg.region.clear(), "RDB_REGION", "region")]
#[case::api_url(|cfg: &mut RdbConfig| cfg.api_url.clear(), "RDB_API_URL", "api_url")]
#[case::fallback(
    |cfg: &mut RdbConfig| cfg.fallback_engine_version.clear(),
    "RDB_FALLBACK_ENGINE_VERSION",
    "fallback_engine_version"
)]
fn config_validation_produces_actionable_errors_for_all_fields(
    valid_config: RdbConfig,
    #[case] mutate: fn(&mut RdbConfig),
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let mut cfg = valid_config;
    mutate(&mut cfg);

    let message = cfg.validate().expect_err("validation should fail").to_string();

    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains("rdb-lifecycle.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
#[case::no_scheme("rdb.example.test/v1")]
#[case::not_a_base("mailto:ops@example.test")]
fn config_validation_rejects_unusable_api_url(valid_config: RdbConfig, #[case] api_url: &str) {
    let cfg = RdbConfig {
        api_url: api_url.to_owned(),
        ..valid_config
    };

    let err = cfg.validate().expect_err("api_url should be rejected");
    assert!(matches!(err, ConfigError::Invalid(_)), "unexpected: {err}");
    assert!(err.to_string().contains("api_url"), "unexpected: {err}");
}

#[rstest]
fn api_base_url_keeps_configured_path(valid_config: RdbConfig) {
    let url = valid_config.api_base_url().expect("valid api_url");
    assert_eq!(url.as_str(), "https://rdb.example.test/v1");
}

#[rstest]
fn config_validation_rejects_zero_poll_budget(valid_config: RdbConfig) {
    let cfg = RdbConfig {
        poll_max_attempts: 0,
        ..valid_config
    };

    let err = cfg.validate().expect_err("zero attempts is invalid");
    assert!(matches!(err, ConfigError::Invalid(_)), "unexpected: {err}");
}

#[rstest]
fn retry_policy_reflects_poll_settings(valid_config: RdbConfig) {
    let cfg = RdbConfig {
        poll_max_attempts: 3,
        poll_interval_secs: 5,
        ..valid_config
    };

    assert_eq!(
        cfg.retry_policy(),
        RetryPolicy::new(3, Duration::from_secs(5))
    );
}

#[rstest]
fn default_retry_policy_polls_sixty_times_every_thirty_seconds() {
    assert_eq!(
        RetryPolicy::default(),
        RetryPolicy::new(60, Duration::from_secs(30))
    );
}

#[rstest]
fn manager_settings_trim_region_and_fallback(valid_config: RdbConfig) {
    let cfg = RdbConfig {
        region: String::from(" nl-ams "),
        fallback_engine_version: String::from(" 15.4 "),
        ..valid_config
    };

    let settings = cfg.manager_settings();

    assert_eq!(settings.region, "nl-ams");
    assert_eq!(settings.fallback_engine_version, "15.4");
}

#[rstest]
fn master_password_is_required_when_requested(valid_config: RdbConfig) {
    let cfg = RdbConfig {
        master_password: None,
        ..valid_config
    };

    let message = cfg
        .master_password()
        .expect_err("password is required")
        .to_string();
    assert!(
        message.contains("RDB_MASTER_PASSWORD"),
        "error should mention env var: {message}"
    );
}

#[rstest]
fn debug_output_redacts_credentials(valid_config: RdbConfig) {
    let rendered = format!("{valid_config:?}");

    assert!(!rendered.contains("RDBSECRETKEYEXAMPLE"), "{rendered}");
    assert!(!rendered.contains("battery staple"), "{rendered}");
    assert!(rendered.contains("[REDACTED]"), "{rendered}");
    assert!(rendered.contains("fr-par"), "{rendered}");
}

#[rstest]
fn secret_accessors_expose_values_for_requests(valid_config: RdbConfig) {
    let secret = valid_config.secret_key();
    let password = valid_config
        .master_password()
        .expect("password configured");

    assert_eq!(secret.expose(), "RDBSECRETKEYEXAMPLE");
    assert_eq!(password.expose(), "correct horse battery staple");
    assert_eq!(format!("{password:?}"), "Secret(\"[REDACTED]\")");
}
