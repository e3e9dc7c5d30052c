//! Configuration file support for mdmake.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.mdmake/config.toml` - User-wide defaults
//! - Project: `<root>/.mdmake/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default external build program.
pub const DEFAULT_PROGRAM: &str = "make";

/// Default descriptor file name inside every project directory.
pub const DEFAULT_DESCRIPTOR: &str = "mdMake";

/// Default shared build-rules include that marks a root project as buildable.
pub const DEFAULT_BUILD_RULES: &str = "mdMake.common";

/// mdmake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External step settings
    pub step: StepConfig,

    /// Build run settings
    pub build: BuildConfig,
}

/// Settings for the external build/clean step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StepConfig {
    /// Program invoked once per project (default: make)
    pub program: Option<String>,

    /// Descriptor file name (default: mdMake)
    pub descriptor: Option<String>,

    /// Shared rules file whose `-include` marks the root as buildable
    pub build_rules: Option<String>,
}

/// Settings for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Target used when TARGETS is not given
    pub default_target: Option<String>,

    /// Arguments handed to every external step before the CLI passthrough
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.step.program.is_some() {
            self.step.program = other.step.program;
        }
        if other.step.descriptor.is_some() {
            self.step.descriptor = other.step.descriptor;
        }
        if other.step.build_rules.is_some() {
            self.step.build_rules = other.step.build_rules;
        }

        if other.build.default_target.is_some() {
            self.build.default_target = other.build.default_target;
        }
        if !other.build.extra_args.is_empty() {
            self.build.extra_args = other.build.extra_args;
        }
    }

    pub fn program(&self) -> &str {
        self.step.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    pub fn descriptor(&self) -> &str {
        self.step.descriptor.as_deref().unwrap_or(DEFAULT_DESCRIPTOR)
    }

    pub fn build_rules(&self) -> &str {
        self.step.build_rules.as_deref().unwrap_or(DEFAULT_BUILD_RULES)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.mdmake/config.toml)
/// 2. Global config (~/.mdmake/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global mdmake config directory (~/.mdmake).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mdmake"))
}

/// Get the global config path (~/.mdmake/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.mdmake/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mdmake").join("config.toml")
}
