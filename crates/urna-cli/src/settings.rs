//! Runtime settings, read from an optional TOML file and `URNA_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use urna_service::{HashingConfig, Limits};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path: PathBuf,
  pub limits:        Limits,
  pub hashing:       HashingConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path: PathBuf::from("urna.db"),
      limits:        Limits::default(),
      hashing:       HashingConfig::default(),
    }
  }
}

impl Settings {
  /// Layer `URNA_*` environment variables over `path`, which may be absent.
  /// Nested keys use `__`, e.g. `URNA_LIMITS__PASSWORD_MIN=10`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let mut settings: Settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("URNA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise Settings")?;

    settings.database_path = expand_tilde(&settings.database_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
