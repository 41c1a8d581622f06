//! Running build commands as subprocesses.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::project::CommandRunner;
use crate::util::process::ProcessBuilder;

/// Runs commands with [`ProcessBuilder`], failing on a non-zero exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl CommandRunner for SubprocessRunner {
    fn run(
        &self,
        argv: &[String],
        cwd: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<()> {
        let mut cmd = ProcessBuilder::from_argv(argv)?.envs(env);
        if let Some(cwd) = cwd {
            cmd = cmd.cwd(cwd);
        }
        tracing::debug!("Running: {}", cmd.display_command());
        let output = cmd.exec_and_check()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            tracing::trace!("{}", line);
        }
        Ok(())
    }
}
