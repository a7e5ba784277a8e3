//! CLI command handlers.

pub mod actions;
pub mod config;
pub mod console;
pub mod session;
