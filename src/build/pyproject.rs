//! Build-system descriptor (`pyproject.toml`) loading.
//!
//! Decides whether a source tree is built through a standardized backend or
//! through `setup.py`, and with which backend and requirements.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::project::ProjectError;

/// The setuptools backend used when a project declares none.
pub const LEGACY_BACKEND: &str = "setuptools.build_meta:__legacy__";

/// Requirements of the implicit setuptools backend.
pub const LEGACY_REQUIRES: &[&str] = &["setuptools>=40.8.0", "wheel"];

/// How to build a source tree with a standardized backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSystem {
    /// `[build-system] requires`
    pub requires: Vec<String>,
    /// `module:object` of the backend
    pub backend: String,
    /// Requirements that must be present even though not declared
    pub check: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PyProject {
    #[serde(rename = "build-system")]
    build_system: Option<toml::Table>,
}

fn malformed(path: &Path, reason: impl Into<String>) -> anyhow::Error {
    ProjectError::MalformedSource {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

/// Load the build system of the source tree at `source_dir`.
///
/// Returns `None` when the tree should be built through `setup.py`.
/// `use_pep517` is the caller's preference; `None` auto-detects.
pub fn load_pyproject(use_pep517: Option<bool>, source_dir: &Path) -> Result<Option<BuildSystem>> {
    let pyproject_path = source_dir.join("pyproject.toml");
    let has_pyproject = pyproject_path.is_file();
    let has_setup = source_dir.join("setup.py").is_file();

    if !has_pyproject && !has_setup {
        return Err(malformed(
            source_dir,
            "neither 'setup.py' nor 'pyproject.toml' found",
        ));
    }

    let build_system = if has_pyproject {
        let text = crate::util::fs::read_to_string(&pyproject_path)?;
        let pyproject: PyProject = toml::from_str(&text)
            .map_err(|e| malformed(&pyproject_path, format!("invalid pyproject.toml: {}", e)))
            .with_context(|| format!("failed to parse {}", pyproject_path.display()))?;
        pyproject.build_system
    } else {
        None
    };

    let declares_backend = build_system
        .as_ref()
        .is_some_and(|t| t.contains_key("build-backend"));

    let use_pep517 = if has_pyproject && !has_setup {
        if use_pep517 == Some(false) {
            return Err(malformed(
                source_dir,
                "has a 'pyproject.toml' and no 'setup.py', so it must be built with its build backend",
            ));
        }
        true
    } else if declares_backend {
        if use_pep517 == Some(false) {
            let backend = build_system
                .as_ref()
                .and_then(|t| t.get("build-backend"))
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            return Err(malformed(
                source_dir,
                format!(
                    "declares build backend `{}`, which cannot be bypassed with setup.py",
                    backend
                ),
            ));
        }
        true
    } else {
        use_pep517.unwrap_or(has_pyproject)
    };

    if !use_pep517 {
        tracing::debug!("Using setup.py for {}", source_dir.display());
        return Ok(None);
    }

    let Some(table) = build_system else {
        return Ok(Some(BuildSystem {
            requires: LEGACY_REQUIRES.iter().map(|s| s.to_string()).collect(),
            backend: LEGACY_BACKEND.to_string(),
            check: Vec::new(),
        }));
    };

    let requires = match table.get("requires") {
        None => {
            return Err(malformed(
                &pyproject_path,
                "[build-system] table is missing the 'requires' key",
            ))
        }
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                malformed(
                    &pyproject_path,
                    "[build-system] 'requires' must be a list of strings",
                )
            })?,
        Some(_) => {
            return Err(malformed(
                &pyproject_path,
                "[build-system] 'requires' must be a list of strings",
            ))
        }
    };

    let (backend, check) = match table.get("build-backend") {
        Some(toml::Value::String(backend)) => (backend.clone(), Vec::new()),
        Some(_) => {
            return Err(malformed(
                &pyproject_path,
                "[build-system] 'build-backend' must be a string",
            ))
        }
        None => (
            LEGACY_BACKEND.to_string(),
            LEGACY_REQUIRES.iter().map(|s| s.to_string()).collect(),
        ),
    };

    tracing::debug!("Using build backend `{}` for {}", backend, source_dir.display());
    Ok(Some(BuildSystem {
        requires,
        backend,
        check,
    }))
}
