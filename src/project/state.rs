//! The project state machine.
//!
//! Each variant of [`ProjectState`] is one representation of a project, from
//! a bare remote URL down to an unpacked wheel. A state answers the queries
//! its data supports and returns [`Query::NeedsAdvance`] for the rest;
//! `advance` produces the next, more concrete state.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{Metadata, Scheme, TargetTags};
use crate::project::states::{
    LegacyNonWheelProject, LegacyProject, LocalArchive, LocalEditableDirectory,
    LocalEditableLegacy, LocalEditableNamedVcs, LocalNamedVcs, LocalNonEditableDirectory,
    LocalSdist, LocalUnnamedVcs, LocalWheel, ModernProject, RemoteArchive,
    RemoteEditableNamedVcs, RemoteNamedVcs, RemoteSdist, RemoteUnnamedVcs, RemoteWheel,
    UnpackedSources, UnpackedWheel,
};
use crate::project::{ProjectError, Query};

/// Identifies a state variant in history and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    RemoteArchive,
    RemoteSdist,
    RemoteWheel,
    RemoteNamedVcs,
    RemoteUnnamedVcs,
    RemoteEditableNamedVcs,
    LocalArchive,
    LocalSdist,
    LocalWheel,
    LocalNamedVcs,
    LocalUnnamedVcs,
    LocalNonEditableDirectory,
    LocalEditableDirectory,
    LocalEditableLegacy,
    LocalEditableNamedVcs,
    UnpackedSources,
    UnpackedWheel,
    LegacyProject,
    LegacyNonWheelProject,
    ModernProject,
}

impl StateKind {
    /// The variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::RemoteArchive => "RemoteArchive",
            StateKind::RemoteSdist => "RemoteSdist",
            StateKind::RemoteWheel => "RemoteWheel",
            StateKind::RemoteNamedVcs => "RemoteNamedVcs",
            StateKind::RemoteUnnamedVcs => "RemoteUnnamedVcs",
            StateKind::RemoteEditableNamedVcs => "RemoteEditableNamedVcs",
            StateKind::LocalArchive => "LocalArchive",
            StateKind::LocalSdist => "LocalSdist",
            StateKind::LocalWheel => "LocalWheel",
            StateKind::LocalNamedVcs => "LocalNamedVcs",
            StateKind::LocalUnnamedVcs => "LocalUnnamedVcs",
            StateKind::LocalNonEditableDirectory => "LocalNonEditableDirectory",
            StateKind::LocalEditableDirectory => "LocalEditableDirectory",
            StateKind::LocalEditableLegacy => "LocalEditableLegacy",
            StateKind::LocalEditableNamedVcs => "LocalEditableNamedVcs",
            StateKind::UnpackedSources => "UnpackedSources",
            StateKind::UnpackedWheel => "UnpackedWheel",
            StateKind::LegacyProject => "LegacyProject",
            StateKind::LegacyNonWheelProject => "LegacyNonWheelProject",
            StateKind::ModernProject => "ModernProject",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability set of a project state.
///
/// Every query defaults to `NeedsAdvance`. Errors are genuine failures, never
/// "I don't know".
pub trait ProjectInterface {
    /// Which variant this is.
    fn kind(&self) -> StateKind;

    /// The project name.
    fn name(&self) -> Result<Query<String>> {
        Ok(Query::NeedsAdvance)
    }

    /// The project version.
    fn version(&self) -> Result<Query<String>> {
        Ok(Query::NeedsAdvance)
    }

    /// The declared runtime dependencies (`Requires-Dist`).
    fn dependencies(&self) -> Result<Query<Vec<String>>> {
        Ok(Query::NeedsAdvance)
    }

    /// The core metadata.
    fn metadata(&self) -> Result<Query<Metadata>> {
        Ok(Query::NeedsAdvance)
    }

    /// Whether the project can be installed for `tags`.
    fn is_compatible(&self, _tags: &TargetTags) -> Result<Query<bool>> {
        Ok(Query::NeedsAdvance)
    }

    /// Install into `scheme`.
    fn install(&self, _scheme: &Scheme) -> Result<Query<()>> {
        Ok(Query::NeedsAdvance)
    }

    /// Remove a previous installation from `scheme`.
    fn uninstall(&self, _scheme: &Scheme) -> Result<Query<()>> {
        Ok(Query::NeedsAdvance)
    }

    /// Copy the source distribution into `dir`.
    fn save_sdist(&self, _dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::NeedsAdvance)
    }

    /// Copy the wheel into `dir`.
    fn save_wheel(&self, _dir: &Path) -> Result<Query<PathBuf>> {
        Ok(Query::NeedsAdvance)
    }

    /// Produce the next, more concrete state.
    fn advance(&self) -> Result<ProjectState> {
        Err(ProjectError::NoTransition { state: self.kind() }.into())
    }

    /// Whether no further transition exists.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// One representation of a project.
#[derive(Debug)]
pub enum ProjectState {
    RemoteArchive(RemoteArchive),
    RemoteSdist(RemoteSdist),
    RemoteWheel(RemoteWheel),
    RemoteNamedVcs(RemoteNamedVcs),
    RemoteUnnamedVcs(RemoteUnnamedVcs),
    RemoteEditableNamedVcs(RemoteEditableNamedVcs),
    LocalArchive(LocalArchive),
    LocalSdist(LocalSdist),
    LocalWheel(LocalWheel),
    LocalNamedVcs(LocalNamedVcs),
    LocalUnnamedVcs(LocalUnnamedVcs),
    LocalNonEditableDirectory(LocalNonEditableDirectory),
    LocalEditableDirectory(LocalEditableDirectory),
    LocalEditableLegacy(LocalEditableLegacy),
    LocalEditableNamedVcs(LocalEditableNamedVcs),
    UnpackedSources(UnpackedSources),
    UnpackedWheel(UnpackedWheel),
    LegacyProject(LegacyProject),
    LegacyNonWheelProject(LegacyNonWheelProject),
    ModernProject(ModernProject),
}

impl ProjectState {
    /// Dispatch to the variant's capability set.
    pub fn as_interface(&self) -> &dyn ProjectInterface {
        match self {
            ProjectState::RemoteArchive(s) => s,
            ProjectState::RemoteSdist(s) => s,
            ProjectState::RemoteWheel(s) => s,
            ProjectState::RemoteNamedVcs(s) => s,
            ProjectState::RemoteUnnamedVcs(s) => s,
            ProjectState::RemoteEditableNamedVcs(s) => s,
            ProjectState::LocalArchive(s) => s,
            ProjectState::LocalSdist(s) => s,
            ProjectState::LocalWheel(s) => s,
            ProjectState::LocalNamedVcs(s) => s,
            ProjectState::LocalUnnamedVcs(s) => s,
            ProjectState::LocalNonEditableDirectory(s) => s,
            ProjectState::LocalEditableDirectory(s) => s,
            ProjectState::LocalEditableLegacy(s) => s,
            ProjectState::LocalEditableNamedVcs(s) => s,
            ProjectState::UnpackedSources(s) => s,
            ProjectState::UnpackedWheel(s) => s,
            ProjectState::LegacyProject(s) => s,
            ProjectState::LegacyNonWheelProject(s) => s,
            ProjectState::ModernProject(s) => s,
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> StateKind {
        self.as_interface().kind()
    }

    /// Whether no further transition exists.
    pub fn is_terminal(&self) -> bool {
        self.as_interface().is_terminal()
    }
}

macro_rules! impl_from_state {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ProjectState {
                fn from(state: $variant) -> Self {
                    ProjectState::$variant(state)
                }
            }
        )*
    };
}

impl_from_state!(
    RemoteArchive,
    RemoteSdist,
    RemoteWheel,
    RemoteNamedVcs,
    RemoteUnnamedVcs,
    RemoteEditableNamedVcs,
    LocalArchive,
    LocalSdist,
    LocalWheel,
    LocalNamedVcs,
    LocalUnnamedVcs,
    LocalNonEditableDirectory,
    LocalEditableDirectory,
    LocalEditableLegacy,
    LocalEditableNamedVcs,
    UnpackedSources,
    UnpackedWheel,
    LegacyProject,
    LegacyNonWheelProject,
    ModernProject,
);
