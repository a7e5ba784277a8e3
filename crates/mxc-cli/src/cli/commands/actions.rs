//! One-shot console actions.
//!
//! Each subcommand opens the same console the REPL uses, performs a single
//! action and lets the renderer print the result. Ctrl+C abandons the
//! in-flight request and surfaces as [`interrupt::InterruptedError`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use mxc_core::config::Config;
use mxc_core::console::SessionConsole;
use mxc_core::identity::{FileSessionStore, SessionIdentity};
use mxc_core::interrupt;
use mxc_core::upload::FileSelection;
use tracing::debug;

use crate::renderer::CliRenderer;

/// Resolves the session and worker URLs and builds a console printing to the terminal.
pub fn open_console(config: &Config) -> Result<SessionConsole<CliRenderer>> {
    let store = FileSessionStore::default_location();
    let identity = SessionIdentity::init(&store)
        .with_context(|| format!("load session from {}", store.path().display()))?;
    let endpoints = config.endpoints()?;
    debug!(
        session = identity.id(),
        matrix = endpoints.matrix_base(),
        session_worker = endpoints.session_base(),
        "console opened"
    );

    Ok(SessionConsole::new(identity, endpoints, CliRenderer::new())
        .with_upload_policy(config.upload_policy()))
}

pub async fn info(config: &Config) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.load_api_info()).await
}

pub async fn context(config: &Config) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.load_context()).await
}

pub async fn clear(config: &Config) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.clear_session()).await
}

pub async fn chat(config: &Config, message: &str) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.send_chat(message)).await
}

pub async fn code(config: &Config, prompt: &str, language: &str) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.generate_code(prompt, language)).await
}

pub async fn run(config: &Config, command: &str) -> Result<()> {
    let mut console = open_console(config)?;
    interrupt::run_until_interrupted(console.run_command(command)).await
}

pub async fn upload(config: &Config, paths: Vec<PathBuf>) -> Result<()> {
    let selection = FileSelection::from_paths(paths);
    let mut console = open_console(config)?;
    let summary = interrupt::run_until_interrupted(console.upload(&selection)).await?;
    if summary.sent == 0 && summary.skipped > 0 {
        anyhow::bail!("None of the {} selected file(s) could be read", summary.skipped);
    }
    Ok(())
}
