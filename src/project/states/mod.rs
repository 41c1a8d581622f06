//! Project state variants.

mod local;
mod remote;
mod source;
mod unpacked;

pub use local::{
    LocalArchive, LocalEditableDirectory, LocalEditableLegacy, LocalEditableNamedVcs,
    LocalNamedVcs, LocalNonEditableDirectory, LocalSdist, LocalUnnamedVcs, LocalWheel,
};
pub use remote::{
    RemoteArchive, RemoteEditableNamedVcs, RemoteNamedVcs, RemoteSdist, RemoteUnnamedVcs,
    RemoteWheel,
};
pub use source::{LegacyNonWheelProject, LegacyProject, ModernProject};
pub use unpacked::{UnpackedSources, UnpackedWheel};

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::link::split_ext;
use crate::core::requirement::canonicalize_name;
use crate::core::{Link, ParsedRequirement, WheelFilename};
use crate::project::{ProjectContext, ProjectError};
use crate::util::TempDirectory;

/// The link of a requirement the factory already checked.
fn link_of(req: &ParsedRequirement) -> Result<Link> {
    req.link.clone().ok_or_else(|| {
        ProjectError::MissingLink {
            requirement: req.input.clone(),
        }
        .into()
    })
}

/// The declared name of a requirement classified as named.
fn declared_name(req: &ParsedRequirement) -> Result<String> {
    req.name().map(str::to_string).ok_or_else(|| {
        ProjectError::InvalidRequirement {
            input: req.input.clone(),
            reason: "a project name is required".to_string(),
        }
        .into()
    })
}

/// Parse the wheel filename a link or path ends in.
fn wheel_filename(filename: &str, req: &ParsedRequirement) -> Result<WheelFilename> {
    WheelFilename::parse(filename).map_err(|e| {
        ProjectError::InvalidRequirement {
            input: req.input.clone(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Extract the version from an `<name>-<version>.<ext>` sdist filename.
///
/// The name part must match `name` canonically; names containing `-` are
/// tried at every split point. The version must start with a digit.
fn sdist_version(filename: &str, name: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    if ext.is_empty() {
        return None;
    }
    let canonical = canonicalize_name(name);
    stem.match_indices('-').find_map(|(at, _)| {
        let version = &stem[at + 1..];
        let starts_with_digit = version.starts_with(|c: char| c.is_ascii_digit());
        (canonicalize_name(&stem[..at]) == canonical && starts_with_digit)
            .then(|| version.to_string())
    })
}

/// Download a link into a fresh temporary directory.
fn download(ctx: &ProjectContext, link: &Link) -> Result<(TempDirectory, PathBuf)> {
    let dir = ctx.temp_dir("download")?;
    let dest = dir.join(link.filename());
    tracing::info!("Downloading {}", link.url_without_fragment());
    ctx.services
        .download
        .download(link, &dest)
        .with_context(|| format!("failed to download {}", link.url_without_fragment()))?;
    Ok((dir, dest))
}

/// Check a VCS link out into a fresh temporary directory.
///
/// Returns the directory and the project root within it.
fn checkout(ctx: &ProjectContext, link: &Link) -> Result<(TempDirectory, PathBuf)> {
    let dir = ctx.temp_dir("checkout")?;
    let dest = dir.join("checkout");
    tracing::info!("Checking out {}", link.url_without_fragment());
    ctx.services
        .vcs
        .checkout(link, &dest)
        .with_context(|| format!("failed to check out {}", link.url_without_fragment()))?;
    let root = with_subdirectory(&dest, link)?;
    Ok((dir, root))
}

/// Unpack an archive (or copy a directory) into a fresh temporary directory.
///
/// A single top-level directory in the result is treated as the project
/// root, as sdists conventionally contain one.
fn unpack(ctx: &ProjectContext, source: &Path, link: &Link) -> Result<(TempDirectory, PathBuf)> {
    let dir = ctx.temp_dir("unpack")?;
    let dest = dir.join("src");
    tracing::debug!("Unpacking {} into {}", source.display(), dest.display());
    ctx.services.unpack.unpack(source, &dest)?;

    let root = if source.is_dir() {
        dest
    } else {
        single_top_level_dir(&dest)?.unwrap_or(dest)
    };
    let root = with_subdirectory(&root, link)?;
    Ok((dir, root))
}

fn single_top_level_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(Some(only.path())),
        _ => Ok(None),
    }
}

fn with_subdirectory(root: &Path, link: &Link) -> Result<PathBuf> {
    let Some(sub) = link.subdirectory_fragment() else {
        return Ok(root.to_path_buf());
    };
    let path = root.join(&sub);
    if !path.is_dir() {
        return Err(ProjectError::MalformedSource {
            path,
            reason: format!("subdirectory `{}` does not exist", sub),
        }
        .into());
    }
    Ok(path)
}

/// Return the cached value, computing it on first use.
///
/// A failed computation is not cached.
fn cached<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

/// Copy a file into `dir`, keeping its name.
fn save_copy(source: &Path, dir: &Path) -> Result<PathBuf> {
    crate::util::fs::ensure_dir(dir)?;
    let filename = source
        .file_name()
        .with_context(|| format!("not a file: {}", source.display()))?;
    let dest = dir.join(filename);
    std::fs::copy(source, &dest).with_context(|| {
        format!("failed to copy {} to {}", source.display(), dest.display())
    })?;
    tracing::info!("Saved {}", dest.display());
    Ok(dest)
}
