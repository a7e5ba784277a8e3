//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;
use wiremock::MockServer;

/// Creates a temp MXC_HOME directory for test isolation.
pub fn temp_mxc_home() -> TempDir {
    TempDir::new().expect("create temp mxc home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// `mxc` with an isolated home and both workers pointed at `server`.
pub fn mxc_against(home: &Path, server: &MockServer) -> Command {
    let mut cmd = cargo_bin_cmd!("mxc");
    cmd.env("MXC_HOME", home)
        .env("MXC_MATRIX_URL", server.uri())
        .env("MXC_SESSION_URL", server.uri())
        .env_remove("MXC_LOG");
    cmd
}

/// Writes a known session identifier into the state file.
pub fn seed_session(home: &Path, id: &str) {
    std::fs::write(
        home.join("state.toml"),
        format!("matrix_session_id = \"{id}\"\n"),
    )
    .expect("write state file");
}
