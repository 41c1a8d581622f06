//! Configuration file support for Quay.
//!
//! Quay supports two configuration file locations:
//! - Global: `~/.quay/config.toml` - User-wide defaults
//! - Project: `.quay/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::project::ProjectConfig;
use crate::util::process::find_python;

/// Quay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Install settings
    pub install: InstallConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Run setup scripts without reading user configuration
    pub isolated: Option<bool>,

    /// Prefer standardized builds (unset = auto-detect)
    pub use_pep517: Option<bool>,

    /// Whether legacy projects may be built into wheels
    pub legacy_wheel_builds: Option<bool>,

    /// Interpreter used for every build invocation
    pub python: Option<PathBuf>,

    /// Python tag passed to legacy wheel builds
    pub python_tag: Option<String>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstallConfig {
    /// Byte-compile installed modules
    pub compile: Option<bool>,

    /// Alternate root for legacy installs
    pub root: Option<PathBuf>,

    /// Checkout directory for editable VCS requirements
    pub src_dir: Option<PathBuf>,

    /// Interpreter version used to lay out install schemes, e.g. `3.11`
    pub python_version: Option<String>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetConfig {
    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
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
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.isolated.is_some() {
            self.build.isolated = other.build.isolated;
        }
        if other.build.use_pep517.is_some() {
            self.build.use_pep517 = other.build.use_pep517;
        }
        if other.build.legacy_wheel_builds.is_some() {
            self.build.legacy_wheel_builds = other.build.legacy_wheel_builds;
        }
        if other.build.python.is_some() {
            self.build.python = other.build.python;
        }
        if other.build.python_tag.is_some() {
            self.build.python_tag = other.build.python_tag;
        }

        // Install settings
        if other.install.compile.is_some() {
            self.install.compile = other.install.compile;
        }
        if other.install.root.is_some() {
            self.install.root = other.install.root;
        }
        if other.install.src_dir.is_some() {
            self.install.src_dir = other.install.src_dir;
        }
        if other.install.python_version.is_some() {
            self.install.python_version = other.install.python_version;
        }

        // Net settings
        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }
    }

    /// Build the immutable configuration shared by every project state.
    ///
    /// Relative `src-dir` values are resolved against `cwd`.
    pub fn project_config(&self, cwd: &Path) -> ProjectConfig {
        let python = self
            .build
            .python
            .clone()
            .or_else(find_python)
            .unwrap_or_else(|| PathBuf::from("python3"));

        let src_dir = match self.install.src_dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => cwd.join(dir),
            None => cwd.join("src"),
        };

        ProjectConfig {
            isolated: self.build.isolated.unwrap_or(false),
            use_pep517: self.build.use_pep517,
            legacy_wheel_builds: self.build.legacy_wheel_builds.unwrap_or(true),
            python,
            compile_bytecode: self.install.compile.unwrap_or(true),
            root: self.install.root.clone(),
            src_dir,
            python_tag: self.build.python_tag.clone(),
            temp_root: None,
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.quay/config.toml)
/// 2. Global config (~/.quay/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global quay config directory (~/.quay).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".quay"))
}

/// Get the global config path (~/.quay/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.quay/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".quay").join("config.toml")
}
