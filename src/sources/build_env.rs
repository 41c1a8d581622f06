//! The build environment used when none is configured.

use std::collections::HashMap;

use anyhow::Result;

use crate::project::BuildEnvironment;

/// Builds in the configured interpreter as-is.
///
/// Every requirement is assumed to be installed and no variables are set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBuildEnvironment;

impl BuildEnvironment for NoopBuildEnvironment {
    fn missing(&self, _requirements: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn prepare(&self, requirements: &[String]) -> Result<HashMap<String, String>> {
        if !requirements.is_empty() {
            tracing::debug!(
                "Assuming build requirements are installed: {}",
                requirements.join(", ")
            );
        }
        Ok(HashMap::new())
    }
}
