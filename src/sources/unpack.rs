//! Unpacking sources into a working directory.

use std::path::Path;

use anyhow::{Context, Result};

use crate::project::Unpacker;
use crate::util::archive::unpack_archive;
use crate::util::fs::copy_dir_all;

/// Extracts archives and copies directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveUnpacker;

impl Unpacker for ArchiveUnpacker {
    fn unpack(&self, source: &Path, dest: &Path) -> Result<()> {
        if source.is_dir() {
            copy_dir_all(source, dest)
                .with_context(|| format!("failed to copy {}", source.display()))
        } else {
            unpack_archive(source, dest)
                .with_context(|| format!("failed to unpack {}", source.display()))
        }
    }
}
