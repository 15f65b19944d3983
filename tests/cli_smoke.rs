//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

const CONFIG_ENV: [&str; 4] = [
    "RDB_SECRET_KEY",
    "RDB_MASTER_PASSWORD",
    "RDB_REGION",
    "RDB_API_URL",
];

#[test]
fn cli_help_describes_workflow() {
    let mut cmd = cargo_bin_cmd!("rdb-lifecycle");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(contains("rdb-lifecycle"))
        .stdout(contains("--version"))
        .stdout(contains("--engine-version").not())
        .stdout(contains("--no-wait").not());
}

#[test]
fn cli_rejects_unknown_flags() {
    let mut cmd = cargo_bin_cmd!("rdb-lifecycle");
    cmd.args(["--identifier", "t1"]);

    cmd.assert().failure().code(2);
}

#[test]
fn cli_reports_missing_secret_key() {
    let mut cmd = cargo_bin_cmd!("rdb-lifecycle");
    for name in CONFIG_ENV {
        cmd.env_remove(name);
    }
    cmd.env("RDB_CONFIG_PATH", "/nonexistent/rdb-lifecycle.toml");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("configuration error"));
}

#[test]
fn cli_reports_missing_master_password_before_contacting_provider() {
    let mut cmd = cargo_bin_cmd!("rdb-lifecycle");
    for name in CONFIG_ENV {
        cmd.env_remove(name);
    }
    cmd.env("RDB_SECRET_KEY", "test-secret");
    cmd.env("RDB_API_URL", "http://127.0.0.1:9");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("RDB_MASTER_PASSWORD"));
}

#[test]
fn cli_rejects_api_url_that_is_not_a_url() {
    let mut cmd = cargo_bin_cmd!("rdb-lifecycle");
    for name in CONFIG_ENV {
        cmd.env_remove(name);
    }
    cmd.env("RDB_SECRET_KEY", "test-secret");
    cmd.env("RDB_API_URL", "rdb.example.test");
    cmd.env("RDB_MASTER_PASSWORD", "hunter2");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("api_url"));
}
