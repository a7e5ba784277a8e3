//! Core mxc library (config, session identity, dispatcher, console state).

pub mod config;
pub mod console;
pub mod dispatch;
pub mod events;
pub mod identity;
pub mod interrupt;
pub mod logging;
pub mod routing;
pub mod upload;
