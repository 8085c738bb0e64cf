//! Command implementations.

pub mod completions;
pub mod render;
pub mod theme;
pub mod version;

use crate::config::{self, CliOverrides, ConfigLayer, ReportConfig};
use crate::error::Result;
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Home directory from `HOME`, if set.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Resolve typed settings from every config layer.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or a value is invalid.
pub fn resolve_config(overrides: &CliOverrides) -> Result<ReportConfig> {
    let project_dir = env::current_dir()?;
    let home = home_dir();
    let env_layer = ConfigLayer::from_env();
    let merged = config::load_config(&project_dir, home.as_deref(), &env_layer, overrides)?;
    debug!(keys = merged.values.len(), "config layers merged");
    ReportConfig::from_layer(&merged, home.as_deref())
}
