//! The context handed to every project state.

use std::sync::Arc;

use anyhow::Result;

use crate::project::{ProjectConfig, ProjectServices};
use crate::util::TempDirectory;

/// Configuration and collaborators, shared by reference between states.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub config: Arc<ProjectConfig>,
    pub services: Arc<ProjectServices>,
}

impl ProjectContext {
    /// Create a context.
    pub fn new(config: ProjectConfig, services: ProjectServices) -> Self {
        ProjectContext {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    /// Create a temporary directory under the configured temp root.
    pub fn temp_dir(&self, kind: &'static str) -> Result<TempDirectory> {
        TempDirectory::new(kind, self.config.temp_root.as_deref())
    }
}
