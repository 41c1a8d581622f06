//! Archive extraction.
//!
//! Supports gzip-compressed and plain tarballs, zip files, and wheels.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;
use zip::ZipArchive;

use crate::core::link::split_ext;

/// Unpack an archive file into `dest`, choosing the format by extension.
pub fn unpack_archive(source: &Path, dest: &Path) -> Result<()> {
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (_, ext) = split_ext(&filename);

    match ext.to_ascii_lowercase().as_str() {
        ".tar.gz" | ".tgz" => {
            let file = open(source)?;
            extract_tar(GzDecoder::new(BufReader::new(file)), dest)
        }
        ".tar" => extract_tar(BufReader::new(open(source)?), dest),
        ".zip" | ".whl" => extract_zip(source, dest),
        other => bail!(
            "unsupported archive format `{}`: {}",
            other,
            source.display()
        ),
    }
    .with_context(|| format!("failed to unpack {}", source.display()))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Extract a tar stream, refusing entries that escape `dest`.
pub fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut archive = Archive::new(reader);
    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry.path().context("failed to get entry path")?.into_owned();

        if entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            bail!(
                "tarball entry escapes destination directory: {}",
                entry_path.display()
            );
        }

        let output_path = dest.join(&entry_path);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let entry_type = entry.header().entry_type();
        match entry_type {
            tar::EntryType::Directory => {
                std::fs::create_dir_all(&output_path).with_context(|| {
                    format!("failed to create directory: {}", output_path.display())
                })?;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::Link => {
                entry.unpack(&output_path).with_context(|| {
                    format!("failed to extract file: {}", output_path.display())
                })?;
            }
            tar::EntryType::Symlink => {
                #[cfg(unix)]
                {
                    if let Ok(Some(target)) = entry.link_name() {
                        std::os::unix::fs::symlink(target.as_ref(), &output_path)
                            .with_context(|| {
                                format!("failed to create symlink: {}", output_path.display())
                            })?;
                    }
                }
                #[cfg(windows)]
                {
                    tracing::debug!("Skipping symlink on Windows: {}", entry_path.display());
                }
            }
            _ => {
                tracing::debug!(
                    "Skipping unsupported entry type {:?}: {}",
                    entry_type,
                    entry_path.display()
                );
            }
        }
    }

    Ok(())
}

/// Extract a zip (or wheel) file.
pub fn extract_zip(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(open(source)?))
        .with_context(|| format!("not a zip archive: {}", source.display()))?;
    archive
        .extract(dest)
        .with_context(|| format!("failed to extract {}", source.display()))?;
    Ok(())
}

/// Read one member of a zip archive into a string.
pub fn read_zip_member(source: &Path, member: &str) -> Result<String> {
    let mut archive = ZipArchive::new(BufReader::new(open(source)?))
        .with_context(|| format!("not a zip archive: {}", source.display()))?;
    let mut file = archive
        .by_name(member)
        .with_context(|| format!("`{}` not found in {}", member, source.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("failed to read `{}` from {}", member, source.display()))?;
    Ok(contents)
}

/// List member names of a zip archive.
pub fn zip_members(source: &Path) -> Result<Vec<String>> {
    let archive = ZipArchive::new(BufReader::new(open(source)?))
        .with_context(|| format!("not a zip archive: {}", source.display()))?;
    Ok(archive.file_names().map(str::to_string).collect())
}
