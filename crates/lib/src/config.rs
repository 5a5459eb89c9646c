//! Session configuration.
//!
//! Loaded from an optional `depwatch.toml` in the workspace root; every key
//! has a default, so an absent file means a default session.
//!
//! ```toml
//! fields = ["dependencies", "devDependencies"]
//! debounce_ms = 500
//! debounce = "per-path"
//! show_status = false
//! package_manager = "pnpm"
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::manifest::default_fields;
use crate::pm::PmPreference;
use crate::watch::debounce::DebouncePolicy;

/// Configuration file name looked up in the first workspace root.
pub const CONFIG_FILENAME: &str = "depwatch.toml";

const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Ordered whitelist of manifest fields to observe.
  pub fields: Vec<String>,
  /// Debounce delay in milliseconds.
  pub debounce_ms: u64,
  /// Debounce scheduling policy.
  pub debounce: DebouncePolicy,
  /// Whether watch mode prints the pending-changes status line.
  pub show_status: bool,
  /// Install tool preference.
  pub package_manager: PmPreference,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      fields: default_fields(),
      debounce_ms: DEFAULT_DEBOUNCE_MS,
      debounce: DebouncePolicy::Global,
      show_status: true,
      package_manager: PmPreference::Auto,
    }
  }
}

impl Config {
  /// Load configuration from `path`.
  ///
  /// Returns `Ok(None)` if the file doesn't exist.
  pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(ConfigError::Read(e)),
    };

    let config = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(Some(config))
  }

  /// The debounce delay as a duration.
  pub fn debounce_delay(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file: {0}")]
  Read(#[source] io::Error),

  #[error("failed to parse config file: {0}")]
  Parse(#[source] toml::de::Error),
}
