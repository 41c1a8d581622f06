//! Mapping from trait sets to initial project states.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::core::ParsedRequirement;
use crate::project::state::{ProjectState, StateKind};
use crate::project::states::{
    LocalArchive, LocalEditableDirectory, LocalEditableNamedVcs, LocalNamedVcs,
    LocalNonEditableDirectory, LocalSdist, LocalUnnamedVcs, LocalWheel, RemoteArchive,
    RemoteEditableNamedVcs, RemoteNamedVcs, RemoteSdist, RemoteUnnamedVcs, RemoteWheel,
};
use crate::project::{ProjectContext, ProjectError, Trait, TraitSet};

/// Builds the initial state for a classified requirement.
pub type FromReq = fn(&ProjectContext, &Arc<ParsedRequirement>) -> Result<ProjectState>;

/// A state that can start a project, and the traits that select it.
#[derive(Clone, Copy)]
pub struct ProjectType {
    pub kind: StateKind,
    pub traits: &'static [Trait],
    pub from_req: FromReq,
}

impl std::fmt::Debug for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectType")
            .field("kind", &self.kind)
            .field("traits", &self.traits)
            .finish()
    }
}

macro_rules! project_type {
    ($state:ident, [$($t:ident),+]) => {
        ProjectType {
            kind: StateKind::$state,
            traits: &[$(Trait::$t),+],
            from_req: $state::from_req,
        }
    };
}

static PROJECTS: &[ProjectType] = &[
    project_type!(RemoteArchive, [Remote, Archive, Unnamed]),
    project_type!(RemoteSdist, [Remote, Archive, Named]),
    project_type!(RemoteWheel, [Remote, Wheel, Named]),
    project_type!(RemoteWheel, [Remote, Wheel, Unnamed]),
    project_type!(RemoteNamedVcs, [Remote, Named, Vcs]),
    project_type!(RemoteUnnamedVcs, [Remote, Unnamed, Vcs]),
    project_type!(RemoteEditableNamedVcs, [Remote, Editable, Named, Vcs]),
    project_type!(LocalArchive, [Local, Archive, Unnamed]),
    project_type!(LocalSdist, [Local, Archive, Named]),
    project_type!(LocalWheel, [Local, Wheel, Named]),
    project_type!(LocalWheel, [Local, Wheel, Unnamed]),
    project_type!(LocalNamedVcs, [Local, Named, Vcs]),
    project_type!(LocalUnnamedVcs, [Local, Unnamed, Vcs]),
    project_type!(LocalEditableNamedVcs, [Local, Editable, Named, Vcs]),
    project_type!(LocalNonEditableDirectory, [Local, Directory, Unnamed]),
    project_type!(LocalNonEditableDirectory, [Local, Directory, Named]),
    project_type!(LocalEditableDirectory, [Local, Directory, Editable, Unnamed]),
    project_type!(LocalEditableDirectory, [Local, Directory, Editable, Named]),
];

/// Every state a project can start in.
pub fn all_projects() -> &'static [ProjectType] {
    PROJECTS
}

/// Lookup table from trait set to project type.
#[derive(Debug, Clone)]
pub struct ProjectTypeRegistry {
    types: HashMap<TraitSet, ProjectType>,
}

impl ProjectTypeRegistry {
    /// Build the registry, rejecting two types that declare the same traits.
    pub fn from_projects(projects: &[ProjectType]) -> Result<Self> {
        let mut types: HashMap<TraitSet, ProjectType> = HashMap::new();
        for project in projects {
            let traits = TraitSet::from(project.traits);
            if let Some(existing) = types.get(&traits) {
                return Err(ProjectError::DuplicateProjectTraits {
                    first: existing.kind,
                    second: project.kind,
                    traits,
                }
                .into());
            }
            types.insert(traits, *project);
        }
        Ok(ProjectTypeRegistry { types })
    }

    /// The project type registered for exactly `traits`.
    pub fn lookup(&self, traits: &TraitSet) -> Result<&ProjectType> {
        self.types.get(traits).ok_or_else(|| {
            ProjectError::NoMatchingProjectType {
                traits: traits.clone(),
            }
            .into()
        })
    }

    /// Number of registered trait sets.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
