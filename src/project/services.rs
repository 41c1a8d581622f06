//! External collaborators used while preparing projects.
//!
//! Every side effect a project state performs goes through one of these
//! traits, so tests can substitute fakes for the network, the filesystem
//! layout of archives, subprocesses and version control.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::core::Link;
use crate::sources::{ArchiveUnpacker, GitCheckout, HttpDownloader, NoopBuildEnvironment, SubprocessRunner};

/// Fetches the bytes a link points at.
pub trait Downloader: Send + Sync {
    /// Download `link` into the file `dest`.
    fn download(&self, link: &Link, dest: &Path) -> Result<()>;
}

/// Expands an archive (or copies a directory) into a destination.
pub trait Unpacker: Send + Sync {
    /// Unpack `source` into the directory `dest`.
    fn unpack(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// Runs external commands.
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion; a non-zero exit status is an error.
    fn run(&self, argv: &[String], cwd: Option<&Path>, env: &HashMap<String, String>)
        -> Result<()>;
}

/// Materializes a version-control reference.
pub trait VcsCheckout: Send + Sync {
    /// Check out `link` into the directory `dest`.
    fn checkout(&self, link: &Link, dest: &Path) -> Result<()>;
}

/// The environment standardized build backends run in.
pub trait BuildEnvironment: Send + Sync {
    /// Return the requirements from `requirements` that are not satisfied.
    fn missing(&self, requirements: &[String]) -> Result<Vec<String>>;

    /// Make `requirements` available; returns environment variables for the
    /// backend invocation.
    fn prepare(&self, requirements: &[String]) -> Result<HashMap<String, String>>;
}

/// The set of collaborators, constructed once and shared read-only.
#[derive(Clone)]
pub struct ProjectServices {
    pub download: Arc<dyn Downloader>,
    pub unpack: Arc<dyn Unpacker>,
    pub runner: Arc<dyn CommandRunner>,
    pub vcs: Arc<dyn VcsCheckout>,
    pub build_env: Arc<dyn BuildEnvironment>,
}

impl ProjectServices {
    /// Services backed by HTTP, local archives, subprocesses and git.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        Ok(ProjectServices {
            download: Arc::new(HttpDownloader::new(timeout_secs)?),
            unpack: Arc::new(ArchiveUnpacker),
            runner: Arc::new(SubprocessRunner),
            vcs: Arc::new(GitCheckout),
            build_env: Arc::new(NoopBuildEnvironment),
        })
    }

    /// Replace the downloader.
    pub fn with_downloader(mut self, download: Arc<dyn Downloader>) -> Self {
        self.download = download;
        self
    }

    /// Replace the unpacker.
    pub fn with_unpacker(mut self, unpack: Arc<dyn Unpacker>) -> Self {
        self.unpack = unpack;
        self
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the VCS checkout.
    pub fn with_vcs(mut self, vcs: Arc<dyn VcsCheckout>) -> Self {
        self.vcs = vcs;
        self
    }

    /// Replace the build environment.
    pub fn with_build_env(mut self, build_env: Arc<dyn BuildEnvironment>) -> Self {
        self.build_env = build_env;
        self
    }
}

impl fmt::Debug for ProjectServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectServices").finish_non_exhaustive()
    }
}
