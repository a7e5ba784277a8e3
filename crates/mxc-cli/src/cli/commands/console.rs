//! Interactive console command handler.

use anyhow::Result;
use mxc_core::config::Config;

use super::actions::open_console;
use crate::modes;

pub async fn run(config: &Config) -> Result<()> {
    let mut console = open_console(config)?;
    modes::repl::run_interactive(&mut console).await
}
