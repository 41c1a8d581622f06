//! Temporary directories shared between project states.
//!
//! The state that receives a `TempDirectory` owns it; descendants hold clones
//! of the same handle, and the directory is deleted when the last one drops.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A reference-counted temporary directory.
#[derive(Clone)]
pub struct TempDirectory {
    kind: &'static str,
    dir: Arc<TempDir>,
}

impl TempDirectory {
    /// Create a fresh directory, optionally under `root`.
    ///
    /// `kind` (e.g. `download`, `unpack`) becomes part of the name.
    pub fn new(kind: &'static str, root: Option<&Path>) -> Result<Self> {
        let prefix = format!("quay-{}-", kind);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(root) => {
                crate::util::fs::ensure_dir(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .with_context(|| format!("failed to create {} directory", kind))?;

        tracing::debug!("created {} directory {}", kind, dir.path().display());

        Ok(TempDirectory {
            kind,
            dir: Arc::new(dir),
        })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Join a relative path onto the directory.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }
}

impl fmt::Debug for TempDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TempDirectory({}: {})", self.kind, self.path().display())
    }
}
