//! Project-level configuration
//!
//! Loads optional `pytidy.toml` from the working directory. Every field
//! has a default, so a missing file is the common case, and a bad file
//! degrades to defaults with a warning rather than aborting the run.
//!
//! # Configuration Format
//!
//! ```toml
//! # pytidy.toml
//!
//! [external]
//! formatter = true
//! scanner = true
//! formatter_timeout_secs = 60
//! scanner_timeout_secs = 120
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// External tool policy
    #[serde(default)]
    pub external: ExternalToolsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalToolsConfig {
    /// Allow the external formatter (black)
    #[serde(default = "default_enabled")]
    pub formatter: bool,

    /// Allow the vulnerability scanner (pip-audit)
    #[serde(default = "default_enabled")]
    pub scanner: bool,

    /// Formatter timeout in seconds (0 = no timeout)
    #[serde(default = "default_formatter_timeout")]
    pub formatter_timeout_secs: u64,

    /// Scanner timeout in seconds (0 = no timeout)
    #[serde(default = "default_scanner_timeout")]
    pub scanner_timeout_secs: u64,
}

impl Default for ExternalToolsConfig {
    fn default() -> Self {
        Self {
            formatter: default_enabled(),
            scanner: default_enabled(),
            formatter_timeout_secs: default_formatter_timeout(),
            scanner_timeout_secs: default_scanner_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_formatter_timeout() -> u64 {
    60
}

fn default_scanner_timeout() -> u64 {
    120
}

/// Load `pytidy.toml` from `dir`, falling back to defaults when the file
/// is absent or unreadable.
pub fn load_config(dir: &Path) -> ProjectConfig {
    let path = dir.join("pytidy.toml");
    if !path.exists() {
        return ProjectConfig::default();
    }
    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded project config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            ProjectConfig::default()
        }
    }
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
