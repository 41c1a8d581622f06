//! States for unpacked source trees and unpacked wheels.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::build::load_pyproject;
use crate::core::{Metadata, ParsedRequirement, Scheme, TargetTags, WheelFilename, WheelInfo};
use crate::install::{install_wheel, uninstall_distribution};
use crate::project::state::{ProjectInterface, ProjectState, StateKind};
use crate::project::states::{cached, save_copy, LegacyProject, ModernProject};
use crate::project::{ProjectContext, Query};
use crate::util::fs::find_single_with_suffix;
use crate::util::TempDirectory;

/// A source tree whose build system is not yet known.
#[derive(Debug)]
pub struct UnpackedSources {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    dir: PathBuf,
    temp: Option<TempDirectory>,
    name: Option<String>,
    version: Option<String>,
}

impl UnpackedSources {
    pub(crate) fn new(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        dir: PathBuf,
        temp: Option<TempDirectory>,
    ) -> Self {
        UnpackedSources {
            ctx: ctx.clone(),
            req: req.clone(),
            dir,
            temp,
            name: None,
            version: None,
        }
    }

    /// Carry over a name that is already known.
    pub(crate) fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Carry over a version that is already known.
    pub(crate) fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}

impl ProjectInterface for UnpackedSources {
    fn kind(&self) -> StateKind {
        StateKind::UnpackedSources
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(self.name.clone().into())
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(self.version.clone().into())
    }

    fn advance(&self) -> Result<ProjectState> {
        let build_system = load_pyproject(self.ctx.config.use_pep517, &self.dir)?;
        let state = match build_system {
            Some(build_system) => {
                tracing::debug!("Building {} with `{}`", self.dir.display(), build_system.backend);
                ModernProject::new(
                    &self.ctx,
                    &self.req,
                    self.dir.clone(),
                    self.temp.clone(),
                    build_system,
                )
                .into()
            }
            None => {
                tracing::debug!("Building {} with setup.py", self.dir.display());
                LegacyProject::new(&self.ctx, &self.req, self.dir.clone(), self.temp.clone()).into()
            }
        };
        Ok(state)
    }
}

/// An unpacked wheel, ready to be installed.
#[derive(Debug)]
pub struct UnpackedWheel {
    ctx: ProjectContext,
    dir: PathBuf,
    archive: PathBuf,
    wheel: WheelFilename,
    _temp: TempDirectory,
    metadata: OnceCell<Metadata>,
}

impl UnpackedWheel {
    pub(crate) fn new(
        ctx: &ProjectContext,
        dir: PathBuf,
        archive: PathBuf,
        wheel: WheelFilename,
        temp: TempDirectory,
    ) -> Self {
        UnpackedWheel {
            ctx: ctx.clone(),
            dir,
            archive,
            wheel,
            _temp: temp,
            metadata: OnceCell::new(),
        }
    }

    fn dist_info(&self) -> Result<PathBuf> {
        find_single_with_suffix(&self.dir, ".dist-info")
    }

    fn load_metadata(&self) -> Result<&Metadata> {
        cached(&self.metadata, || Metadata::load(&self.dist_info()?.join("METADATA")))
    }
}

impl ProjectInterface for UnpackedWheel {
    fn kind(&self) -> StateKind {
        StateKind::UnpackedWheel
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.load_metadata()?.name.clone()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.load_metadata()?.version.clone()))
    }

    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        Ok(Query::Answered(self.load_metadata()?.requires_dist.clone()))
    }

    fn metadata(&self) -> Result<Query<Metadata>> {
        Ok(Query::Answered(self.load_metadata()?.clone()))
    }

    fn is_compatible(&self, tags: &TargetTags) -> Result<Query<bool>> {
        let wheel_file = self.dist_info()?.join("WHEEL");
        let supported = if wheel_file.is_file() {
            let info = WheelInfo::parse(&crate::util::fs::read_to_string(&wheel_file)?)?;
            if info.tags.is_empty() {
                self.wheel.is_supported_by(tags)
            } else {
                info.is_supported_by(tags)
            }
        } else {
            self.wheel.is_supported_by(tags)
        };
        Ok(Query::Answered(supported))
    }

    fn install(&self, scheme: &Scheme) -> Result<Query<()>> {
        install_wheel(&self.dir, scheme, &self.ctx.config.python)?;
        Ok(Query::Answered(()))
    }

    fn uninstall(&self, scheme: &Scheme) -> Result<Query<()>> {
        let metadata = self.load_metadata()?;
        uninstall_distribution(scheme, &metadata.name, &metadata.version)?;
        Ok(Query::Answered(()))
    }

    fn save_wheel(&self, dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::Answered(save_copy(&self.archive, dir)?))
    }

    fn is_terminal(&self) -> bool {
        true
    }
}
