//! Project preparation.
//!
//! A requirement is classified into an initial [`ProjectState`], and a
//! [`Project`] façade drives that state forward (download, unpack, build)
//! only as far as each query needs.

pub mod config;
pub mod context;
pub mod error;
pub mod factory;
#[allow(clippy::module_inception)]
pub mod project;
pub mod registry;
pub mod services;
pub mod state;
pub mod states;
pub mod traits;

pub use config::ProjectConfig;
pub use context::ProjectContext;
pub use error::ProjectError;
pub use factory::{classify, ProjectFactory};
pub use project::Project;
pub use registry::{all_projects, ProjectType, ProjectTypeRegistry};
pub use services::{
    BuildEnvironment, CommandRunner, Downloader, ProjectServices, Unpacker, VcsCheckout,
};
pub use state::{ProjectInterface, ProjectState, StateKind};
pub use traits::{Trait, TraitSet};

/// The answer of a state to a query or action.
///
/// `NeedsAdvance` means the state cannot answer and a more concrete
/// successor must be consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query<T> {
    Answered(T),
    NeedsAdvance,
}

impl<T> From<Option<T>> for Query<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Query::Answered(value),
            None => Query::NeedsAdvance,
        }
    }
}
