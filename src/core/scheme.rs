//! Install schemes - the destination directories an install targets.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Destination directories for an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    /// Installation prefix
    pub prefix: PathBuf,
    /// Pure-Python library directory
    pub purelib: PathBuf,
    /// Platform-specific library directory
    pub platlib: PathBuf,
    /// C header directory (project headers go in a per-project subdirectory)
    pub headers: PathBuf,
    /// Executable scripts directory
    pub scripts: PathBuf,
    /// Data files root
    pub data: PathBuf,
}

impl Scheme {
    /// The conventional POSIX layout under a prefix.
    pub fn for_prefix(prefix: &Path, python_version: &str) -> Self {
        let lib = prefix
            .join("lib")
            .join(format!("python{}", python_version))
            .join("site-packages");
        Scheme {
            prefix: prefix.to_path_buf(),
            purelib: lib.clone(),
            platlib: lib,
            headers: prefix
                .join("include")
                .join(format!("python{}", python_version)),
            scripts: prefix.join("bin"),
            data: prefix.to_path_buf(),
        }
    }

    /// Look up a directory by its wheel `.data` key.
    pub fn get(&self, key: &str) -> Result<&Path> {
        Ok(match key {
            "prefix" => &self.prefix,
            "purelib" => &self.purelib,
            "platlib" => &self.platlib,
            "headers" => &self.headers,
            "scripts" => &self.scripts,
            "data" => &self.data,
            other => bail!("unknown scheme key `{}`", other),
        })
    }

    /// Library directories to search for installed distributions.
    pub fn lib_dirs(&self) -> Vec<&Path> {
        if self.purelib == self.platlib {
            vec![&self.purelib]
        } else {
            vec![&self.purelib, &self.platlib]
        }
    }
}
