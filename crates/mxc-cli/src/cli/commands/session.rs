//! Session identifier command handlers.

use anyhow::{Context, Result};
use mxc_core::identity::{FileSessionStore, SessionIdentity, SessionStore};

pub fn show() -> Result<()> {
    let store = FileSessionStore::default_location();
    let identity = SessionIdentity::init(&store)
        .with_context(|| format!("load session from {}", store.path().display()))?;
    println!("{identity}");
    Ok(())
}

pub fn reset() -> Result<()> {
    let store = FileSessionStore::default_location();
    let previous = store.load().context("read session")?;
    store
        .clear()
        .with_context(|| format!("clear session in {}", store.path().display()))?;
    match previous {
        Some(id) => println!("Forgot session {id}. The next run starts a new session."),
        None => println!("No session stored."),
    }
    Ok(())
}
