//! TOML configuration: `[smtp]` relay settings and `[mail]` content.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use propkit_mail::{SpecMailOptions, SpecSmtpConfig};
use serde::Deserialize;
use tracing::debug;

/// Looked up in the working directory when no path is given.
pub const C_CONFIG_FILE_DEFAULT: &str = "propkit.toml";
/// Environment variable holding the SMTP password.
pub const C_ENV_SMTP_PASSWORD: &str = "PROPKIT_SMTP_PASSWORD";

/// Whole configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecPropkitConfig {
    pub smtp: SpecSmtpConfig,
    pub mail: SpecMailOptions,
}

impl SpecPropkitConfig {
    /// Parse configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `propkit.toml` in the
    /// working directory is used when present, else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            let path_default = Path::new(C_CONFIG_FILE_DEFAULT);
            if path_default.is_file() {
                return Self::load(Some(path_default));
            }
            debug!("no configuration file; using defaults");
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Replace the SMTP password when `password` is set and non-empty.
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|c_value| !c_value.is_empty()) {
            self.smtp.password = Some(password);
        }
        self
    }
}
