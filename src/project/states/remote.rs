//! States for projects that live behind a remote URL.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::requirement::canonicalize_name;
use crate::core::{Link, ParsedRequirement, TargetTags, WheelFilename};
use crate::project::state::{ProjectInterface, ProjectState, StateKind};
use crate::project::states::{
    checkout, declared_name, download, link_of, sdist_version, wheel_filename, with_subdirectory,
    LocalArchive, LocalEditableNamedVcs, LocalSdist, LocalWheel, UnpackedSources,
};
use crate::project::{ProjectContext, Query};

/// An unnamed remote source archive.
#[derive(Debug)]
pub struct RemoteArchive {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
}

impl RemoteArchive {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(RemoteArchive {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
        }
        .into())
    }
}

impl ProjectInterface for RemoteArchive {
    fn kind(&self) -> StateKind {
        StateKind::RemoteArchive
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, path) = download(&self.ctx, &self.link)?;
        Ok(LocalArchive::downloaded(&self.ctx, &self.req, self.link.clone(), path, dir).into())
    }
}

/// A named remote source distribution.
#[derive(Debug)]
pub struct RemoteSdist {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    name: String,
}

impl RemoteSdist {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(RemoteSdist {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
            name: declared_name(req)?,
        }
        .into())
    }
}

impl ProjectInterface for RemoteSdist {
    fn kind(&self) -> StateKind {
        StateKind::RemoteSdist
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.name.clone()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(sdist_version(&self.link.filename(), &self.name).into())
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, path) = download(&self.ctx, &self.link)?;
        Ok(LocalSdist::downloaded(
            &self.ctx,
            &self.req,
            self.link.clone(),
            self.name.clone(),
            path,
            dir,
        )
        .into())
    }
}

/// A remote wheel, named or not.
#[derive(Debug)]
pub struct RemoteWheel {
    ctx: ProjectContext,
    link: Link,
    wheel: WheelFilename,
}

impl RemoteWheel {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        let link = link_of(req)?;
        let wheel = wheel_filename(&link.filename(), req)?;
        Ok(RemoteWheel {
            ctx: ctx.clone(),
            link,
            wheel,
        }
        .into())
    }
}

impl ProjectInterface for RemoteWheel {
    fn kind(&self) -> StateKind {
        StateKind::RemoteWheel
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.wheel.display_name()))
    }

    fn version(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.wheel.version.clone()))
    }

    fn is_compatible(&self, tags: &TargetTags) -> Result<Query<bool>> {
        // The filename can rule a wheel out; confirming needs the WHEEL file
        if self.wheel.is_supported_by(tags) {
            Ok(Query::NeedsAdvance)
        } else {
            Ok(Query::Answered(false))
        }
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, path) = download(&self.ctx, &self.link)?;
        Ok(LocalWheel::downloaded(&self.ctx, self.wheel.clone(), path, dir).into())
    }
}

/// A named remote VCS reference.
#[derive(Debug)]
pub struct RemoteNamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    name: String,
}

impl RemoteNamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(RemoteNamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
            name: declared_name(req)?,
        }
        .into())
    }
}

impl ProjectInterface for RemoteNamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::RemoteNamedVcs
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

/// An unnamed remote VCS reference.
#[derive(Debug)]
pub struct RemoteUnnamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
}

impl RemoteUnnamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(RemoteUnnamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
        }
        .into())
    }
}

impl ProjectInterface for RemoteUnnamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::RemoteUnnamedVcs
    }

    fn advance(&self) -> Result<ProjectState> {
        let (dir, root) = checkout(&self.ctx, &self.link)?;
        Ok(UnpackedSources::new(&self.ctx, &self.req, root, Some(dir)).into())
    }
}

/// An editable, named remote VCS reference.
///
/// The checkout goes to `<src_dir>/<canonical name>` and is kept after
/// installation, since the install points back at it.
#[derive(Debug)]
pub struct RemoteEditableNamedVcs {
    ctx: ProjectContext,
    req: Arc<ParsedRequirement>,
    link: Link,
    name: String,
}

impl RemoteEditableNamedVcs {
    pub fn from_req(ctx: &ProjectContext, req: &Arc<ParsedRequirement>) -> Result<ProjectState> {
        Ok(RemoteEditableNamedVcs {
            ctx: ctx.clone(),
            req: req.clone(),
            link: link_of(req)?,
            name: declared_name(req)?,
        }
        .into())
    }
}

impl ProjectInterface for RemoteEditableNamedVcs {
    fn kind(&self) -> StateKind {
        StateKind::RemoteEditableNamedVcs
    }

    fn name(&self) -> Result<Query<String>> {
        Ok(Query::Answered(self.name.clone()))
    }

    fn advance(&self) -> Result<ProjectState> {
        let dest = self.ctx.config.src_dir.join(canonicalize_name(&self.name));
        crate::util::fs::ensure_dir(&self.ctx.config.src_dir)?;
        tracing::info!(
            "Checking out {} into {}",
            self.link.url_without_fragment(),
            dest.display()
        );
        self.ctx
            .services
            .vcs
            .checkout(&self.link, &dest)
            .with_context(|| format!("failed to check out {}", self.link.url_without_fragment()))?;
        let root = with_subdirectory(&dest, &self.link)?;
        Ok(LocalEditableNamedVcs::checked_out(&self.ctx, &self.req, self.name.clone(), root).into())
    }
}
