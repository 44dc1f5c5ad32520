//! Configuration file loading and parsing.
//!
//! planviz reads optional TOML configuration from three places, highest
//! priority first: the file passed with `--config`, `planviz.toml` in the
//! current directory, and `planviz/config.toml` under the user config
//! directory. Missing files fall back to defaults; malformed files are
//! errors.

use crate::forest::MissingDependencyPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// File name of the repository-level config
pub const REPO_CONFIG_FILE: &str = "planviz.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanvizConfig {
    /// Document rendering configuration (optional).
    pub render: Option<RenderConfig>,
}

/// Document rendering configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    /// Tracker base URL used for issue links.
    pub base_url: Option<String>,
    /// Dependencies on unknown issues: "reject" (default) or "drop".
    pub missing_dependencies: Option<MissingDependencyPolicy>,
    /// Custom field holding the issue category.
    pub category_field: Option<String>,
}

impl PlanvizConfig {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an empty config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(PlanvizConfig::default());
        }
        Self::load_required(path)
    }

    /// Load configuration from `path`, failing if it does not exist.
    pub fn load_required(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PlanvizConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// Builder for loading configuration from multiple sources with priority.
///
/// Priority order (highest to lowest):
/// 1. Explicit config (`--config <FILE>`)
/// 2. Repository config (`./planviz.toml`)
/// 3. User config (`<user config dir>/planviz/config.toml`)
/// 4. Defaults (hardcoded)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    user_config: Option<PlanvizConfig>,
    repo_config: Option<PlanvizConfig>,
    explicit_config: Option<PlanvizConfig>,
}

impl ConfigLoader {
    /// Create a new config loader with only defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and add user-level config (`<config_dir>/config.toml`).
    pub fn with_user_config(mut self, config_dir: &Path) -> Result<Self> {
        self.user_config = Some(PlanvizConfig::load(&config_dir.join("config.toml"))?);
        Ok(self)
    }

    /// Load and add repository-level config (`<dir>/planviz.toml`).
    pub fn with_repo_config(mut self, dir: &Path) -> Result<Self> {
        self.repo_config = Some(PlanvizConfig::load(&dir.join(REPO_CONFIG_FILE))?);
        Ok(self)
    }

    /// Load and add an explicitly named config file, which must exist.
    pub fn with_explicit_config(mut self, path: &Path) -> Result<Self> {
        self.explicit_config = Some(PlanvizConfig::load_required(path)?);
        Ok(self)
    }

    /// Build the effective configuration by merging all sources.
    pub fn build(self) -> EffectiveConfig {
        EffectiveConfig {
            user_config: self.user_config,
            repo_config: self.repo_config,
            explicit_config: self.explicit_config,
        }
    }
}

/// Merged configuration from all sources with priority resolution.
///
/// When accessing a config value, checks sources in order:
/// explicit > repo > user > default
#[derive(Debug, Default)]
pub struct EffectiveConfig {
    user_config: Option<PlanvizConfig>,
    repo_config: Option<PlanvizConfig>,
    explicit_config: Option<PlanvizConfig>,
}

impl EffectiveConfig {
    fn render_value<T>(&self, get: impl Fn(&RenderConfig) -> Option<T>) -> Option<T> {
        [&self.explicit_config, &self.repo_config, &self.user_config]
            .into_iter()
            .flatten()
            .filter_map(|cfg| cfg.render.as_ref())
            .find_map(get)
    }

    /// Get the effective base URL, if any config sets one.
    pub fn base_url(&self) -> Option<String> {
        self.render_value(|render| render.base_url.clone())
    }

    /// Get the effective missing dependency policy (default: reject).
    pub fn missing_dependencies(&self) -> MissingDependencyPolicy {
        self.render_value(|render| render.missing_dependencies)
            .unwrap_or_default()
    }

    /// Get the effective category field, if any.
    pub fn category_field(&self) -> Option<String> {
        self.render_value(|render| render.category_field.clone())
    }
}

/// Make sure a non-empty base URL ends with `/` so `issue/<id>` can be appended.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
