//! `taskretry config` – show config location and effective settings.

use anyhow::Result;
use std::path::Path;
use taskretry_core::config::{self, TaskRetryConfig};

pub fn run_config(explicit: Option<&Path>, cfg: &TaskRetryConfig) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config::config_path()?,
    };
    println!("config:           {}", path.display());
    println!("default_behavior: {}", cfg.retry.default_behavior());
    println!("identifier:       {}", cfg.retry.identifier());
    Ok(())
}
