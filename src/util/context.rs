//! Global context for quay operations.
//!
//! Provides centralized access to configuration, paths, and the services
//! every command builds projects with.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::Scheme;
use crate::project::{ProjectConfig, ProjectServices};
use crate::util::config::{
    global_config_dir, global_config_path, load_config, project_config_path, Config,
};
use crate::util::process::ProcessBuilder;

/// Interpreter version assumed when none is configured and none can be
/// queried.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global quay data (~/.quay/)
    home: PathBuf,

    /// Global config merged with the project config under `cwd`
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".quay"));
        let global = global_config_path().unwrap_or_else(|| home.join("config.toml"));
        let config = load_config(&global, &project_config_path(&cwd));
        GlobalContext {
            cwd,
            home,
            config,
        }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the quay home directory (~/.quay/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration for project preparation.
    pub fn project_config(&self) -> ProjectConfig {
        self.config.project_config(&self.cwd)
    }

    /// Services backed by the network, subprocesses and git.
    pub fn services(&self) -> Result<ProjectServices> {
        ProjectServices::new(self.config.net.timeout_secs)
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// The install scheme for `prefix`.
    ///
    /// The interpreter version comes from `install.python-version`, then from
    /// asking the configured interpreter.
    pub fn scheme(&self, prefix: &Path) -> Scheme {
        let version = self
            .config
            .install
            .python_version
            .clone()
            .or_else(|| interpreter_version(&self.project_config().python))
            .unwrap_or_else(|| DEFAULT_PYTHON_VERSION.to_string());
        Scheme::for_prefix(&self.resolve_path(prefix), &version)
    }
}

/// Ask an interpreter for its `major.minor` version.
fn interpreter_version(python: &Path) -> Option<String> {
    let output = ProcessBuilder::new(python)
        .arg("-c")
        .arg("import sys; print('%d.%d' % sys.version_info[:2])")
        .exec_and_check()
        .ok()?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        return None;
    }
    tracing::debug!("{} reports version {}", python.display(), version);
    Some(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_reads_project_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".quay")).unwrap();
        std::fs::write(
            tmp.path().join(".quay/config.toml"),
            "[build]\nlegacy-wheel-builds = false\n\n[install]\npython-version = \"3.9\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert!(!ctx.project_config().legacy_wheel_builds);

        let scheme = ctx.scheme(Path::new("env"));
        assert_eq!(
            scheme.purelib,
            tmp.path().join("env/lib/python3.9/site-packages")
        );
    }

    #[test]
    fn test_missing_interpreter_has_no_version() {
        assert!(interpreter_version(Path::new("/nonexistent/python")).is_none());
    }

    #[test]
    fn test_resolve_path() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        assert_eq!(ctx.resolve_path(Path::new("out")), PathBuf::from("/work/out"));
        assert_eq!(ctx.resolve_path(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
