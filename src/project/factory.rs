//! Turning parsed requirements into projects.

use std::sync::Arc;

use anyhow::Result;

use crate::core::ParsedRequirement;
use crate::project::{
    all_projects, Project, ProjectConfig, ProjectContext, ProjectError, ProjectServices,
    ProjectTypeRegistry, Trait, TraitSet,
};

/// Compute the trait set of a requirement.
///
/// The requirement must carry a link.
pub fn classify(req: &ParsedRequirement) -> Result<TraitSet> {
    let link = req.link.as_ref().ok_or_else(|| ProjectError::MissingLink {
        requirement: req.input.clone(),
    })?;

    let mut traits = TraitSet::new();
    let local = link.is_file();
    traits.insert(if local { Trait::Local } else { Trait::Remote });

    let directory = local
        && !link.is_vcs()
        && link.file_path().map(|p| p.is_dir()).unwrap_or(false);
    if directory {
        traits.insert(Trait::Directory);
    }
    if req.editable {
        traits.insert(Trait::Editable);
    }
    traits.insert(if req.requirement.is_some() {
        Trait::Named
    } else {
        Trait::Unnamed
    });
    if link.is_vcs() {
        traits.insert(Trait::Vcs);
    }
    if !directory {
        if link.is_wheel() {
            traits.insert(Trait::Wheel);
        } else if link.is_archive() {
            traits.insert(Trait::Archive);
        }
    }
    Ok(traits)
}

/// Creates projects from requirements.
///
/// Holds the shared context every project is created with.
#[derive(Debug, Clone)]
pub struct ProjectFactory {
    ctx: ProjectContext,
    registry: ProjectTypeRegistry,
}

impl ProjectFactory {
    /// Create a factory with the built-in project types.
    pub fn new(config: ProjectConfig, services: ProjectServices) -> Result<Self> {
        Ok(ProjectFactory {
            ctx: ProjectContext::new(config, services),
            registry: ProjectTypeRegistry::from_projects(all_projects())?,
        })
    }

    /// Create a project in the initial state selected by the requirement's
    /// traits.
    pub fn from_requirement(&self, req: &ParsedRequirement) -> Result<Project> {
        let traits = classify(req)?;
        let project_type = self.registry.lookup(&traits)?;
        tracing::debug!(
            "Classified `{}` as {} ({})",
            req.input,
            project_type.kind,
            traits
        );
        let state = (project_type.from_req)(&self.ctx, &Arc::new(req.clone()))?;
        Ok(Project::new(state))
    }
}
