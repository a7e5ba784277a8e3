use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("mxc")
        .env("MXC_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("mxc")
        .env("MXC_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("matrix_url"));
    assert!(contents.contains("max_chars = 50000"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("mxc")
        .env("MXC_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_prefers_env_over_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "matrix_url = \"https://matrix.from-file.dev/\"\nsession_url = \"https://session.from-file.dev\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("mxc")
        .env("MXC_HOME", dir.path())
        .env("MXC_MATRIX_URL", "http://127.0.0.1:9")
        .env_remove("MXC_SESSION_URL")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matrix_url  = http://127.0.0.1:9"))
        .stdout(predicate::str::contains(
            "session_url = https://session.from-file.dev",
        ));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "matrix_url = [").unwrap();

    cargo_bin_cmd!("mxc")
        .env("MXC_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("load config"));
}
