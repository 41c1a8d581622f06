//! States for projects on the local filesystem.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::build::{EggInfo, LegacyBuilder};
use crate::core::{Link, Metadata, ParsedRequirement, Scheme, TargetTags, WheelFilename, WheelInfo};
use crate::install::uninstall_egg_link;
use crate::project::state::{ProjectInterface, ProjectState, StateKind};
use crate::project::states::{
    cached, checkout, declared_name, link_of, save_copy, sdist_version, unpack, wheel_filename,
    with_subdirectory, UnpackedSources, UnpackedWheel,
};
use crate::project::{ProjectContext, ProjectError, Query};
use crate::util::archive::{read_zip_member, zip_members};
use crate::util::TempDirectory;

fn local_path(req: &ParsedRequirement, link: &Link) -> Result<PathBuf> {
    link.file_path().ok_or_else(|| {
        ProjectError::InvalidRequirement {
            input: req.input.clone(),
            reason: format!("`{}` is not a local path", link),
        }
        .into()
    })
}

/// An unnamed local source archive.
#[derive(Debug)]
pub struct LocalArchive {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    path: PathBuf,
    _download: Option<TempDirectory>,
}

impl LocalArchive {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = local_path(req, &link)?;
        Ok(LocalArchive {
            ctx: ctx.clone(),
            req: req.clone(),
            link,
            path,
            _download: None,
        }
        .into())
    }

    pub(crate) fn downloaded(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        link: Link,
        path: PathBuf,
        dir: TempDirectory,
    ) -> Self {
        LocalArchive {
            ctx: ctx.clone(),
            req: req.clone(),
            link,
            path,
            _download: Some(dir),
        }
    }
}

impl ProjectInterface for LocalArchive {
    fn kind(&self) -> StateKind {
        StateKind::LocalArchive
    }

    fn save_sdist(&self, dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::Answered(save_copy(&self.path, dir)?))
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = unpack(&self.ctx, &self.path, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir)).into())
    }
}

/// A named local source distribution.
#[derive(Debug)]
pub struct LocalSdist {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    name: String,
    path: PathBuf,
    _download: Option<TempDirectory>,
}

impl LocalSdist {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = local_path(req, &link)?;
        Ok(LocalSdist {
            ctx: ctx.clone(),
            req: req.clone(),
            link,
            name: declared_name(req)?,
            path,
            _download: None,
        }
        .into())
    }

    pub(crate) fn downloaded(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        link: Link,
        name: String,
        path: PathBuf,
        dir: TempDirectory,
    ) -> Self {
        LocalSdist {
            ctx: ctx.clone(),
            req: req.clone(),
            link,
            name,
            path,
            _download: Some(dir),
        }
    }

    fn filename_version(&self) -> Option<String> {
        let filename = self.path.file_name()?.to_string_lossy().into_owned();
        sdist_version(&filename, &self.name)
    }
}

impl ProjectInterface for LocalSdist {
    fn kind(&self) -> StateKind {
        StateKind::LocalSdist
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.name.clone()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(self.filename_version().into())
    }

    fn save_sdist(&self, dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::Answered(save_copy(&self.path, dir)?))
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = unpack(&self.ctx, &self.path, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir))
            .with_name(Some(self.name.clone()))
            .with_version(self.filename_version())
            .into())
    }
}

/// A wheel file on disk.
#[derive(Debug)]
pub struct LocalWheel {
    ctx: ProjectContext,
    path: PathBuf,
    wheel: WheelFilename,
    _dir: Option<TempDirectory>,
}

impl LocalWheel {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = local_path(req, &link)?;
        let wheel = wheel_filename(&link.filename(), req)?;
        Ok(LocalWheel {
            ctx: ctx.clone(),
            path,
            wheel,
            _dir: None,
        }
        .into())
    }

    pub(crate) fn downloaded(
        ctx: &ProjectContext,
        wheel: WheelFilename,
        path: PathBuf,
        dir: TempDirectory,
    ) -> Self {
        LocalWheel {
            ctx: ctx.clone(),
            path,
            wheel,
            _dir: Some(dir),
        }
    }

    /// A wheel produced by a build into `dir`.
    pub(crate) fn built(
        ctx: &ProjectContext,
        path: PathBuf,
        dir: TempDirectory,
    ) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let wheel = WheelFilename::parse(&filename).map_err(|e| ProjectError::BuildFailure {
            backend: "wheel".to_string(),
            message: format!("build produced an invalid wheel: {}", e),
        })?;
        Ok(LocalWheel {
            ctx: ctx.clone(),
            path,
            wheel,
            _dir: Some(dir),
        })
    }

    /// Read `<name>.dist-info/<file>` from the archive.
    fn dist_info_file(&self, file: &str) -> Result<Option<String>> {
        let members = zip_members(&self.path)?;
        let member = members.iter().find(|m| {
            let mut parts = m.split('/');
            matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(dir), Some(f), None) if dir.ends_with(".dist-info") && f == file
            )
        });
        match member {
            Some(member) => Ok(Some(read_zip_member(&self.path, member)?)),
            None => Ok(None),
        }
    }

    fn load_metadata(&self) -> Result<Metadata> {
        let text = self.dist_info_file("METADATA")?.ok_or_else(|| {
            ProjectError::MalformedSource {
                path: self.path.clone(),
                reason: "wheel has no .dist-info/METADATA".to_string(),
            }
        })?;
        Metadata::parse(&text)
    }
}

impl ProjectInterface for LocalWheel {
    fn kind(&self) -> StateKind {
        StateKind::LocalWheel
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.wheel.display_name()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.wheel.version.clone()))
    }

    fn metadata(&self) -> Result<Query<Metadata>> {
        Ok(Query::Answered(self.load_metadata()?))
    }

    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        Ok(Query::Answered(self.load_metadata()?.requires_dist))
    }

    fn is_compatible(&self, tags: &TargetTags) -> Result<Query<bool>> {
        let declared = match self.dist_info_file("WHEEL")? {
            Some(text) => WheelInfo::parse(&text)?.tags,
            None => Vec::new(),
        };
        let supported = if declared.is_empty() {
            self.wheel.is_supported_by(tags)
        } else {
            tags.supports_any(&declared)
        };
        Ok(Query::Answered(supported))
    }

    fn save_wheel(&self, dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::Answered(save_copy(&self.path, dir)?))
    }

    fn advance(&self) -> Result<ProjectState> {
        let dir = self.ctx.temp_dir("unpack")?;
        let dest = dir.join("wheel");
        tracing::debug!("Unpacking {} into {}", self.path.display(), dest.display());
        self.ctx.services.unpack.unpack(&self.path, &dest)?;
        Ok(UnpackedWheel::new(
            &self.ctx,
            dest,
            self.path.clone(),
            self.wheel.clone(),
            dir,
        )
        .into())
    }
}

/// A named VCS reference on the local filesystem.
#[derive(Debug)]
pub struct LocalNamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    name: String,
}

impl LocalNamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(LocalNamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
            name: declared_name(req)?,
        }
        .into())
    }
}

impl ProjectInterface for LocalNamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::LocalNamedVcs
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.name.clone()))
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = checkout(&self.ctx, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir))
            .with_name(Some(self.name.clone()))
            .into())
    }
}

/// An unnamed VCS reference on the local filesystem.
#[derive(Debug)]
pub struct LocalUnnamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
}

impl LocalUnnamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(LocalUnnamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
        }
        .into())
    }
}

impl ProjectInterface for LocalUnnamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::LocalUnnamedVcs
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = checkout(&self.ctx, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir)).into())
    }
}

/// A project directory installed by copying it first.
#[derive(Debug)]
pub struct LocalNonEditableDirectory {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    path: PathBuf,
    name: Option<String>,
}

impl LocalNonEditableDirectory {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = local_path(req, &link)?;
        Ok(LocalNonEditableDirectory {
            ctx: ctx.clone(),
            req: req.clone(),
            link,
            path,
            name: req.name().map(str::to_string),
        }
        .into())
    }
}

impl ProjectInterface for LocalNonEditableDirectory {
    fn kind(&self) -> StateKind {
        StateKind::LocalNonEditableDirectory
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(self.name.clone().into())
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = unpack(&self.ctx, &self.path, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir))
            .with_name(self.name.clone())
            .into())
    }
}

/// A project directory to be installed in place.
#[derive(Debug)]
pub struct LocalEditableDirectory {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    path: PathBuf,
    name: Option<String>,
}

impl LocalEditableDirectory {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = with_subdirectory(&local_path(req, &link)?, &link)?;
        Ok(LocalEditableDirectory {
            ctx: ctx.clone(),
            req: req.clone(),
            path,
            name: req.name().map(str::to_string),
        }
        .into())
    }
}

impl ProjectInterface for LocalEditableDirectory {
    fn kind(&self) -> StateKind {
        StateKind::LocalEditableDirectory
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(self.name.clone().into())
    }

    fn advance(&self) -> Result<ProjectState> {
        Ok(LocalEditableLegacy::new(&self.ctx, &self.req, self.path.clone())?.into())
    }
}

/// An editable, named VCS checkout on the local filesystem.
#[derive(Debug)]
pub struct LocalEditableNamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    name: String,
    path: PathBuf,
}

impl LocalEditableNamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let path = with_subdirectory(&local_path(req, &link)?, &link)?;
        Ok(LocalEditableNamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            name: declared_name(req)?,
            path,
        }
        .into())
    }

    pub(crate) fn checked_out(
        ctx: &ProjectContext,
        req: &Arc<ParsedRequirement>,
        name: String,
        path: PathBuf,
    ) -> Self {
        LocalEditableNamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            name,
            path,
        }
    }
}

impl ProjectInterface for LocalEditableNamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::LocalEditableNamedVcs
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.name.clone()))
    }

    fn advance(&self) -> Result<ProjectState> {
        Ok(LocalEditableLegacy::new(&self.ctx, &self.req, self.path.clone())?.into())
    }
}

/// A source tree installed in place with `setup.py develop`.
#[derive(Debug)]
pub struct LocalEditableLegacy {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    path: PathBuf,
    egg: OnceCell<EggInfo>,
}

impl LocalEditableLegacy {
    /// The directory must contain a `setup.py`.
    pub fn new(ctx: &ProjectContext, req: &Arc<ParsedRequirement>, path: PathBuf) -> Result<Self> {
        if !path.join("setup.py").is_file() {
            return Err(ProjectError::MalformedSource {
                path,
                reason: "editable installs require a setup.py".to_string(),
            }
            .into());
        }
        Ok(LocalEditableLegacy {
            ctx: ctx.clone(),
            req: req.clone(),
            path,
            egg: OnceCell::new(),
        })
    }

    fn builder(&self) -> LegacyBuilder<'_> {
        LegacyBuilder::new(&self.ctx, &self.req, &self.path)
    }

    fn egg_info(&self) -> Result<&EggInfo> {
        cached(&self.egg, || self.builder().egg_info())
    }
}

impl ProjectInterface for LocalEditableLegacy {
    fn kind(&self) -> StateKind {
        StateKind::LocalEditableLegacy
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

    fn is_compatible(&self, _tags: &TargetTags) -> Result<Query<bool>> {
        Ok(Query::Answered(true))
    }

    fn install(&self, scheme: &Scheme) -> Result<Query<()>> {
        let name = self.egg_info()?.metadata.name.clone();
        self.builder().develop(scheme, &name)?;
        Ok(Query::Answered(()))
    }

    fn uninstall(&self, scheme: &Scheme) -> Result<Query<()>> {
        let metadata = &self.egg_info()?.metadata;
        uninstall_egg_link(scheme, &metadata.name, &metadata.version)?;
        Ok(Query::Answered(()))
    }

    fn is_terminal(&self) -> bool {
        true
    }
}
