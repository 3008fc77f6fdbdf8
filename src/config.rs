//! Server configuration loaded from a YAML file.
//!
//! ```yaml
//! addr: 127.0.0.1:9999
//! static_dir: ./static
//! static_prefix: /assets
//! templates: templates/*.tmpl
//! ```
//!
//! Every key is optional; command-line flags override file values.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ADDR: &str = "0.0.0.0:9999";
pub const DEFAULT_STATIC_PREFIX: &str = "/assets";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Directory served under `static_prefix`
    pub static_dir: Option<PathBuf>,
    /// URL prefix for static files
    pub static_prefix: String,
    /// Glob of HTML templates to load at startup
    pub templates: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: None,
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            templates: None,
        }
    }
}

impl ServerConfig {
    /// Load from a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    /// # Errors
    ///
    /// Returns the YAML error for malformed input or unknown keys.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
