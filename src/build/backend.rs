//! Standardized build backend operations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};

use crate::build::hooks::{HookCaller, HookOutcome};
use crate::project::{ProjectError, Query};

/// The hooks quay uses from a standardized backend.
pub struct ModernBackend<'a> {
    caller: HookCaller<'a>,
    display_name: String,
}

impl<'a> ModernBackend<'a> {
    pub fn new(caller: HookCaller<'a>, display_name: impl Into<String>) -> Self {
        ModernBackend {
            caller,
            display_name: display_name.into(),
        }
    }

    fn returned_string(&self, hook: &str, value: Value) -> Result<String> {
        match value {
            Value::String(s) if !s.is_empty() => Ok(s),
            other => Err(ProjectError::BuildFailure {
                backend: self.caller.backend().to_string(),
                message: format!("hook `{}` returned {} instead of a file name", hook, other),
            }
            .into()),
        }
    }

    /// Write a `.dist-info` directory into `metadata_dir`.
    ///
    /// Returns the directory's path, or `NeedsAdvance` when the backend
    /// does not implement the hook.
    pub fn prepare_metadata_for_build_wheel(&self, metadata_dir: &Path) -> Result<Query<PathBuf>> {
        const HOOK: &str = "prepare_metadata_for_build_wheel";
        let outcome = self.caller.run_hook(
            HOOK,
            json!({
                "metadata_directory": metadata_dir.to_string_lossy(),
                "config_settings": {},
            }),
            &format!("Preparing metadata (pyproject.toml) for {}", self.display_name),
        )?;
        match outcome {
            HookOutcome::Returned(value) => {
                let name = self.returned_string(HOOK, value)?;
                Ok(Query::Answered(metadata_dir.join(name)))
            }
            HookOutcome::Missing | HookOutcome::Unsupported => {
                tracing::debug!(
                    "Backend `{}` cannot prepare metadata; a wheel build is needed",
                    self.caller.backend()
                );
                Ok(Query::NeedsAdvance)
            }
        }
    }

    /// Build a wheel into `wheel_dir` and return its path.
    ///
    /// `metadata_dir` is passed along when metadata was already prepared.
    pub fn build_wheel(&self, wheel_dir: &Path, metadata_dir: Option<&Path>) -> Result<PathBuf> {
        const HOOK: &str = "build_wheel";
        let outcome = self.caller.run_hook(
            HOOK,
            json!({
                "wheel_directory": wheel_dir.to_string_lossy(),
                "config_settings": {},
                "metadata_directory": metadata_dir.map(|p| p.to_string_lossy().into_owned()),
            }),
            &format!("Building wheel for {} (pyproject.toml)", self.display_name),
        )?;
        match outcome {
            HookOutcome::Returned(value) => {
                let name = self.returned_string(HOOK, value)?;
                let wheel = wheel_dir.join(name);
                tracing::info!("Built {}", wheel.display());
                Ok(wheel)
            }
            HookOutcome::Missing | HookOutcome::Unsupported => Err(ProjectError::BuildFailure {
                backend: self.caller.backend().to_string(),
                message: "backend does not implement `build_wheel`".to_string(),
            }
            .into()),
        }
    }
}
