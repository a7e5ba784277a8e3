//! Tracing setup.
//!
//! Logs go to a daily-rolling file under `${MXC_HOME}/logs` so that stdout
//! and stderr stay reserved for console output.
//!
//! Filter resolution order:
//! 1. `MXC_LOG` environment variable
//! 2. `log_filter` in config.toml
//! 3. `warn`

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

pub const LOG_ENV: &str = "MXC_LOG";
const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_PREFIX: &str = "mxc";
const LOG_FILE_SUFFIX: &str = "log";

/// Installs the global subscriber writing to `${MXC_HOME}/logs`.
///
/// Returns the writer guard; dropping it flushes pending lines. Returns
/// `None` if the log directory is unusable or a subscriber is already set,
/// in which case logging is silently disabled.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let env_filter = std::env::var(LOG_ENV).ok();
    let directive = resolve_filter(env_filter.as_deref(), config.log_filter.as_deref());
    init_in(&paths::logs_dir(), directive)
}

fn init_in(dir: &Path, directive: &str) -> Option<WorkerGuard> {
    fs::create_dir_all(dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

/// Picks the first non-blank directive.
fn resolve_filter<'a>(env_value: Option<&'a str>, config_value: Option<&'a str>) -> &'a str {
    [env_value, config_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_wins() {
        assert_eq!(resolve_filter(Some("debug"), Some("info")), "debug");
    }

    #[test]
    fn test_config_filter_used_when_env_blank() {
        assert_eq!(resolve_filter(Some(" "), Some("mxc_core=debug")), "mxc_core=debug");
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(resolve_filter(None, None), "warn");
    }
}
