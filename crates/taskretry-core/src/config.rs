use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::{DEFAULT_IDENTIFIER, FALLBACK_RETRY_SPEC};

/// Retry settings (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retry specification used when a task carries no usable override,
    /// e.g. `R3/PT5M` or `PT10S,PT2M,PT1H`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_behavior: Option<String>,
    /// Extension-attribute name a task uses to override the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            default_behavior: Some(FALLBACK_RETRY_SPEC.to_string()),
            identifier: Some(DEFAULT_IDENTIFIER.to_string()),
        }
    }
}

impl RetryConfig {
    /// Configured default specification; unset or blank yields `R3/PT5M`.
    pub fn default_behavior(&self) -> &str {
        non_blank(self.default_behavior.as_deref()).unwrap_or(FALLBACK_RETRY_SPEC)
    }

    /// Configured override attribute name; unset or blank yields `RETRY_CONFIG`.
    pub fn identifier(&self) -> &str {
        non_blank(self.identifier.as_deref()).unwrap_or(DEFAULT_IDENTIFIER)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Global configuration loaded from `~/.config/taskretry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRetryConfig {
    #[serde(default)]
    pub retry: RetryConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TaskRetryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TaskRetryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<TaskRetryConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: TaskRetryConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
