//! States for unpacked source trees with a known build system.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::build::{BuildSystem, EggInfo, HookCaller, LegacyBuilder, ModernBackend};
use crate::core::{Metadata, ParsedRequirement, Scheme, TargetTags};
use crate::install::uninstall_distribution;
use crate::project::state::{ProjectInterface, ProjectState, StateKind};
use crate::project::states::{cached, LocalWheel};
use crate::project::{ProjectContext, ProjectError, Query};
use crate::util::TempDirectory;

fn display_name(req: &ParsedRequirement, dir: &Path) -> String {
    match req.name() {
        Some(name) => name.to_string(),
        None => dir.display().to_string(),
    }
}

/// A source tree built through `setup.py`.
#[derive(Debug)]
pub struct LegacyProject {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    dir: PathBuf,
    _temp: Option<TempDirectory>,
    egg: OnceCell<EggInfo>,
}

impl LegacyProject {
    pub(crate) fn new(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        dir: PathBuf,
        temp: Option<TempDirectory>,
    ) -> Self {
        LegacyProject {
            ctx: ctx.clone(),
            req: req.clone(),
            dir,
            _temp: temp,
            egg: OnceCell::new(),
        }
    }

    fn builder(&self) -> LegacyBuilder<'_> {
        LegacyBuilder::new(&self.ctx, &self.req, &self.dir)
    }

    fn egg_info(&self) -> Result<&EggInfo> {
        cached(&self.egg, || self.builder().egg_info())
    }

    fn non_wheel(&self) -> Result<ProjectState> {
        let metadata = self.egg_info()?.metadata.clone();
        Ok(LegacyNonWheelProject {
            ctx: self.ctx.clone(),
            req: self.req.clone(),
            dir: self.dir.clone(),
            _temp: self._temp.clone(),
            metadata,
        }
        .into())
    }
}

impl ProjectInterface for LegacyProject {
    fn kind(&self) -> StateKind {
        StateKind::LegacyProject
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.egg_info()?.metadata.name.clone()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.egg_info()?.metadata.version.clone()))
    }

    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        Ok(Query::Answered(self.egg_info()?.metadata.requires_dist.clone()))
    }

    fn metadata(&self) -> Result<Query<Metadata>> {
        Ok(Query::Answered(self.egg_info()?.metadata.clone()))
    }

    fn advance(&self) -> Result<ProjectState> {
        if !self.ctx.config.legacy_wheel_builds {
            tracing::debug!("Wheel builds are disabled; installing {} directly", self.dir.display());
            return self.non_wheel();
        }
        match self.builder().build_wheel() {
            Ok((dir, wheel)) => Ok(LocalWheel::built(&self.ctx, wheel, dir)?.into()),
            Err(e) if matches!(
                e.downcast_ref::<ProjectError>(),
                Some(ProjectError::BuildFailure { .. })
            ) =>
            {
                tracing::warn!(
                    "Failed to build a wheel for {}; falling back to setup.py install\n{:#}",
                    display_name(&self.req, &self.dir),
                    e
                );
                self.non_wheel()
            }
            Err(e) => Err(e),
        }
    }
}

/// A setup.py project installed without building a wheel.
#[derive(Debug)]
pub struct LegacyNonWheelProject {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    dir: PathBuf,
    _temp: Option<TempDirectory>,
    metadata: Metadata,
}

impl ProjectInterface for LegacyNonWheelProject {
    fn kind(&self) -> StateKind {
        StateKind::LegacyNonWheelProject
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.metadata.name.clone()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.metadata.version.clone()))
    }

    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        Ok(Query::Answered(self.metadata.requires_dist.clone()))
    }

    fn metadata(&self) -> Result<Query<Metadata>> {
        Ok(Query::Answered(self.metadata.clone()))
    }

    fn is_compatible(&self, _tags: &TargetTags) -> Result<Query<bool>> {
        Ok(Query::Answered(true))
    }

    fn install(&self, scheme: &Scheme) -> Result<Query<()>> {
        LegacyBuilder::new(&self.ctx, &self.req, &self.dir).install(scheme, &self.metadata.name)?;
        Ok(Query::Answered(()))
    }

    fn uninstall(&self, scheme: &Scheme) -> Result<Query<()>> {
        uninstall_distribution(scheme, &self.metadata.name, &self.metadata.version)?;
        Ok(Query::Answered(()))
    }

    fn is_terminal(&self) -> bool {
        true
    }
}

/// Metadata written by `prepare_metadata_for_build_wheel`.
#[derive(Debug)]
struct PreparedMetadata {
    _dir: TempDirectory,
    path: PathBuf,
    metadata: Metadata,
}

/// A source tree built through a standardized backend.
#[derive(Debug)]
pub struct ModernProject {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    dir: PathBuf,
    _temp: Option<TempDirectory>,
    build_system: BuildSystem,
    env: OnceCell<HashMap<String, String>>,
    prepared: OnceCell<Option<PreparedMetadata>>,
}

impl ModernProject {
    pub(crate) fn new(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        dir: PathBuf,
        temp: Option<TempDirectory>,
        build_system: BuildSystem,
    ) -> Self {
        ModernProject {
            ctx: ctx.clone(),
            req: req.clone(),
            dir,
            _temp: temp,
            build_system,
            env: OnceCell::new(),
            prepared: OnceCell::new(),
        }
    }

    /// The environment variables of the prepared build environment.
    fn build_env(&self) -> Result<&HashMap<String, String>> {
        cached(&self.env, || {
            let build_env = &self.ctx.services.build_env;
            let missing = build_env.missing(&self.build_system.check)?;
            if !missing.is_empty() {
                return Err(ProjectError::MissingBuildRequirements { missing }.into());
            }
            build_env.prepare(&self.build_system.requires)
        })
    }

    fn with_backend<T>(&self, f: impl FnOnce(&ModernBackend<'_>) -> Result<T>) -> Result<T> {
        let env = self.build_env()?.clone();
        let caller = HookCaller::new(
            self.ctx.services.runner.as_ref(),
            &self.ctx.config.python,
            &self.dir,
            &self.build_system.backend,
            self.ctx.config.temp_root.as_deref(),
        )
        .with_env(env);
        f(&ModernBackend::new(caller, display_name(&self.req, &self.dir)))
    }

    fn prepared(&self) -> Result<Option<&PreparedMetadata>> {
        let prepared = cached(&self.prepared, || {
            let dir = self.ctx.temp_dir("metadata")?;
            let query =
                self.with_backend(|backend| backend.prepare_metadata_for_build_wheel(dir.path()))?;
            let Query::Answered(path) = query else {
                return Ok(None);
            };
            let metadata = Metadata::load(&path.join("METADATA"))?;
            Ok(Some(PreparedMetadata {
                _dir: dir,
                path,
                metadata,
            }))
        })?;
        Ok(prepared.as_ref())
    }

    fn answer<T>(&self, f: impl FnOnce(&Metadata) -> T) -> Result<Query<T>> {
        Ok(self.prepared()?.map(|p| f(&p.metadata)).into())
    }
}

impl ProjectInterface for ModernProject {
    fn kind(&self) -> StateKind {
        StateKind::ModernProject
    }

    fn name(&self) -> Result<Query<String>> {
        self.answer(|m| m.name.clone())
    }

    fn version(&self) -> Result<Query<String>> {
        self.answer(|m| m.version.clone())
    }

    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        self.answer(|m| m.requires_dist.clone())
    }

    fn metadata(&self) -> Result<Query<Metadata>> {
        self.answer(Metadata::clone)
    }

    fn advance(&self) -> Result<ProjectState> {
        let dir = self.ctx.temp_dir("wheel")?;
        let metadata_dir = self
            .prepared
            .get()
            .and_then(Option::as_ref)
            .map(|p| p.path.as_path());
        let wheel = self.with_backend(|backend| backend.build_wheel(dir.path(), metadata_dir))?;
        Ok(LocalWheel::built(&self.ctx, wheel, dir)?.into())
    }
}
