//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/xlabel/xlabel.toml`
//! 3. Local config: `<dir>/.xlabel.toml`
//! 4. Environment variables: `XLABEL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::application::DEFAULT_LABEL_ATTRIBUTE;
use crate::domain::{SchemeKind, TreeBuilder};

/// Unified configuration for xlabel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Label scheme used when none is given on the command line
    pub scheme: SchemeKind,
    /// Attribute name carrying labels in exported documents
    pub label_attribute: String,
    /// Deepest nesting accepted when building trees
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::default(),
            label_attribute: DEFAULT_LABEL_ATTRIBUTE.to_string(),
            max_depth: TreeBuilder::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub scheme: Option<SchemeKind>,
    pub label_attribute: Option<String>,
    pub max_depth: Option<usize>,
}

/// Get the XDG config directory for xlabel.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "xlabel").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("xlabel.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".xlabel.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            scheme: overlay.scheme.unwrap_or(self.scheme),
            label_attribute: overlay
                .label_attribute
                .clone()
                .unwrap_or_else(|| self.label_attribute.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.xlabel.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply XLABEL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("XLABEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("scheme") {
            settings.scheme = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("label_attribute") {
            settings.label_attribute = val;
        }
        if let Ok(val) = config.get_string("max_depth") {
            settings.max_depth = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("XLABEL_MAX_DEPTH: {e}"),
            })?;
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.label_attribute.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "label_attribute must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::with_max_depth(self.max_depth)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# xlabel configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/xlabel/xlabel.toml
#   Local:  <dir>/.xlabel.toml
#   Env:    XLABEL_* environment variables

# Label scheme: "path-vector", "prime-product" or "region"
# scheme = "path-vector"

# Attribute carrying the label in exported documents
# label_attribute = "label"

# Deepest nesting accepted when building trees
# max_depth = 100000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
