//! Removing installed distributions.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::requirement::canonicalize_name;
use crate::core::Scheme;
use crate::project::ProjectError;
use crate::util::fs::{clean_path, remove_empty_parents};

/// How an installed distribution recorded its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledDist {
    /// `<name>-<version>.dist-info` with a `RECORD`
    DistInfo { lib_dir: PathBuf, path: PathBuf },
    /// `<name>-<version>[-pyX.Y].egg-info` with an `installed-files.txt`
    EggInfo { lib_dir: PathBuf, path: PathBuf },
}

/// Locate the metadata directory of `name` `version` in the scheme.
pub fn find_installed(scheme: &Scheme, name: &str, version: &str) -> Result<Option<InstalledDist>> {
    let canonical = canonicalize_name(name);

    for lib_dir in scheme.lib_dirs() {
        if !lib_dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(lib_dir)
            .with_context(|| format!("failed to read directory: {}", lib_dir.display()))?
        {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let (stem, is_dist_info) = if let Some(stem) = file_name.strip_suffix(".dist-info") {
                (stem, true)
            } else if let Some(stem) = file_name.strip_suffix(".egg-info") {
                (stem, false)
            } else {
                continue;
            };

            let mut parts = stem.splitn(3, '-');
            let (Some(dist_name), Some(dist_version)) = (parts.next(), parts.next()) else {
                continue;
            };
            if canonicalize_name(dist_name) != canonical || dist_version != version {
                continue;
            }

            let lib_dir = lib_dir.to_path_buf();
            let path = entry.path();
            return Ok(Some(if is_dist_info {
                InstalledDist::DistInfo { lib_dir, path }
            } else {
                InstalledDist::EggInfo { lib_dir, path }
            }));
        }
    }

    Ok(None)
}

/// Parse the path column of a `RECORD` file.
pub fn parse_record(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.rsplitn(3, ',');
            let _size = fields.next()?;
            let _hash = fields.next()?;
            let path = fields.next()?;
            Some(path.trim_matches('"').to_string())
        })
        .collect()
}

/// Uninstall `name` `version` from `scheme`.
///
/// Returns the removed files.
pub fn uninstall_distribution(scheme: &Scheme, name: &str, version: &str) -> Result<Vec<PathBuf>> {
    let not_installed = || ProjectError::NotInstalled {
        name: name.to_string(),
        version: version.to_string(),
    };
    let installed = find_installed(scheme, name, version)?.ok_or_else(not_installed)?;

    let (lib_dir, meta_dir, files) = match installed {
        InstalledDist::DistInfo { lib_dir, path } => {
            let record = crate::util::fs::read_to_string(&path.join("RECORD"))?;
            let files: Vec<PathBuf> = parse_record(&record)
                .into_iter()
                .map(|rel| clean_path(&lib_dir.join(rel)))
                .collect();
            (lib_dir, path, files)
        }
        InstalledDist::EggInfo { lib_dir, path } => {
            let listing = path.join("installed-files.txt");
            if !listing.exists() {
                return Err(ProjectError::NotInstalled {
                    name: name.to_string(),
                    version: version.to_string(),
                })
                .with_context(|| {
                    format!("{} has no installed-files.txt", path.display())
                });
            }
            let text = crate::util::fs::read_to_string(&listing)?;
            let files: Vec<PathBuf> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|rel| clean_path(&path.join(rel)))
                .collect();
            (lib_dir, path, files)
        }
    };

    let mut removed = Vec::new();
    let mut parents = BTreeSet::new();

    for file in files {
        if file.starts_with(&meta_dir) {
            continue;
        }
        if remove_file_and_cache(&file)? {
            tracing::debug!("Removed {}", file.display());
            removed.push(file.clone());
        }
        if let Some(parent) = file.parent() {
            parents.insert(parent.to_path_buf());
        }
    }

    if meta_dir.exists() {
        fs::remove_dir_all(&meta_dir)
            .with_context(|| format!("failed to remove {}", meta_dir.display()))?;
        removed.push(meta_dir.clone());
    }

    // Deepest first so nested empty directories are pruned bottom-up
    for dir in parents.iter().rev() {
        let stop = if dir.starts_with(&lib_dir) {
            lib_dir.as_path()
        } else {
            scheme.prefix.as_path()
        };
        remove_empty_parents(dir, stop);
    }

    tracing::info!("Uninstalled {} {}", name, version);
    Ok(removed)
}

/// Remove a file and, for a module, its `__pycache__` entries.
fn remove_file_and_cache(file: &Path) -> Result<bool> {
    if !file.exists() {
        return Ok(false);
    }
    fs::remove_file(file).with_context(|| format!("failed to remove {}", file.display()))?;

    if file.extension().is_some_and(|e| e == "py") {
        if let (Some(parent), Some(stem)) = (file.parent(), file.file_stem()) {
            let cache = parent.join("__pycache__");
            let prefix = format!("{}.", stem.to_string_lossy());
            if let Ok(entries) = fs::read_dir(&cache) {
                for entry in entries.flatten() {
                    if entry.file_name().to_string_lossy().starts_with(&prefix) {
                        let _ = fs::remove_file(entry.path());
                    }
                }
            }
            let _ = fs::remove_dir(&cache);
        }
    }
    Ok(true)
}

/// Uninstall an editable (develop) installation of `name`.
///
/// Removes the `.egg-link` and the matching `easy-install.pth` line.
pub fn uninstall_egg_link(scheme: &Scheme, name: &str, version: &str) -> Result<Vec<PathBuf>> {
    let candidates = [
        name.to_string(),
        canonicalize_name(name),
        name.replace('-', "_"),
    ];

    for lib_dir in scheme.lib_dirs() {
        for candidate in &candidates {
            let egg_link = lib_dir.join(format!("{}.egg-link", candidate));
            if !egg_link.is_file() {
                continue;
            }
            let contents = crate::util::fs::read_to_string(&egg_link)?;
            let develop_dir = contents.lines().next().unwrap_or("").trim().to_string();

            fs::remove_file(&egg_link)
                .with_context(|| format!("failed to remove {}", egg_link.display()))?;
            let mut removed = vec![egg_link];

            let pth = lib_dir.join("easy-install.pth");
            if pth.is_file() && !develop_dir.is_empty() {
                let text = crate::util::fs::read_to_string(&pth)?;
                let kept: Vec<&str> = text
                    .lines()
                    .filter(|line| line.trim() != develop_dir)
                    .collect();
                let mut out = kept.join("\n");
                if !out.is_empty() {
                    out.push('\n');
                }
                fs::write(&pth, out)
                    .with_context(|| format!("failed to write {}", pth.display()))?;
                removed.push(pth);
            }

            tracing::info!("Uninstalled editable {} ({})", name, develop_dir);
            return Ok(removed);
        }
    }

    Err(ProjectError::NotInstalled {
        name: name.to_string(),
        version: version.to_string(),
    }
    .into())
}
