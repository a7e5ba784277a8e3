//! Configuration management for mxc.
//!
//! Loads configuration from ${MXC_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::routing::Endpoints;
use crate::upload::TruncationPolicy;

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../default_config.toml");

pub const DEFAULT_MATRIX_URL: &str = "https://matrix.ai-n.workers.dev";
pub const DEFAULT_SESSION_URL: &str = "https://session.ai-n.workers.dev";

pub const MATRIX_URL_ENV: &str = "MXC_MATRIX_URL";
pub const SESSION_URL_ENV: &str = "MXC_SESSION_URL";

pub mod paths {
    //! Path resolution for mxc configuration and state.
    //!
    //! `MXC_HOME` resolution order:
    //! 1. `MXC_HOME` environment variable (if set)
    //! 2. ~/.config/mxc (default)

    use std::path::PathBuf;

    /// Returns the mxc home directory.
    pub fn mxc_home() -> PathBuf {
        if let Ok(home) = std::env::var("MXC_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".mxc"),
            |h| h.join(".config").join("mxc"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        mxc_home().join("config.toml")
    }

    /// Returns the path to the durable client state (session identifier).
    pub fn state_path() -> PathBuf {
        mxc_home().join("state.toml")
    }

    /// Returns the directory that holds rolling log files.
    pub fn logs_dir() -> PathBuf {
        mxc_home().join("logs")
    }
}

/// Upload settings for the session memory pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Uploaded file text is cut to this many characters.
    pub max_chars: usize,
    /// Append the continuation marker even when nothing was cut.
    pub always_append_ellipsis: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let policy = TruncationPolicy::default();
        Self {
            max_chars: policy.max_chars,
            always_append_ellipsis: policy.always_append_ellipsis,
        }
    }
}

impl From<&UploadConfig> for TruncationPolicy {
    fn from(config: &UploadConfig) -> Self {
        TruncationPolicy {
            max_chars: config.max_chars,
            always_append_ellipsis: config.always_append_ellipsis,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the matrix worker
    pub matrix_url: Option<String>,

    /// Base URL of the session worker
    pub session_url: Option<String>,

    /// Tracing filter directive for the log file
    pub log_filter: Option<String>,

    pub upload: UploadConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves both worker base URLs with precedence env > config > default.
    ///
    /// # Errors
    /// Returns an error if a configured URL is not a valid absolute URL.
    pub fn endpoints(&self) -> Result<Endpoints> {
        let matrix = resolve_base_url(
            self.matrix_url.as_deref(),
            MATRIX_URL_ENV,
            DEFAULT_MATRIX_URL,
            "matrix worker",
        )?;
        let session = resolve_base_url(
            self.session_url.as_deref(),
            SESSION_URL_ENV,
            DEFAULT_SESSION_URL,
            "session worker",
        )?;
        Ok(Endpoints::new(matrix, session))
    }

    /// Returns the truncation policy applied to uploaded files.
    pub fn upload_policy(&self) -> TruncationPolicy {
        TruncationPolicy::from(&self.upload)
    }
}

/// Resolves a base URL with precedence: env > config > default.
fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    let env_value = std::env::var(env_var).ok();
    pick_base_url(
        env_value.as_deref(),
        config_base_url,
        default_url,
        service_name,
    )
}

/// Empty strings are treated as unset.
fn pick_base_url(
    env_value: Option<&str>,
    config_value: Option<&str>,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    let chosen = [env_value, config_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty());

    match chosen {
        Some(url) => {
            url::Url::parse(url)
                .with_context(|| format!("Invalid {service_name} base URL: {url}"))?;
            Ok(url.to_string())
        }
        None => Ok(default_url.to_string()),
    }
}
