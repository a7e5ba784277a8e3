//! Runtime execution modes.
//!
//! - `repl`: interactive line-based console (default when no subcommand is given)

pub mod repl;
