//! Config command handlers.

use anyhow::{Context, Result};
use mxc_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn show(config: &config::Config) -> Result<()> {
    let endpoints = config.endpoints()?;
    let policy = config.upload_policy();
    println!("matrix_url  = {}", endpoints.matrix_base());
    println!("session_url = {}", endpoints.session_base());
    println!("upload.max_chars = {}", policy.max_chars);
    println!(
        "upload.always_append_ellipsis = {}",
        policy.always_append_ellipsis
    );
    Ok(())
}
