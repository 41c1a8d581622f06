//! Calling standardized build-backend hooks in a subprocess.
//!
//! Each call writes `input.json` into a fresh control directory, runs the
//! bundled in-process script with the build interpreter, and reads
//! `output.json` back.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::project::{CommandRunner, ProjectError};
use crate::util::{Spinner, TempDirectory};

/// The script that runs inside the build interpreter.
pub const IN_PROCESS_SCRIPT: &str = include_str!("in_process.py");

/// File name the script is written under in the control directory.
pub const IN_PROCESS_NAME: &str = "_in_process.py";

/// Environment variable naming the backend for the script.
pub const BACKEND_ENV: &str = "QUAY_BUILD_BACKEND";

/// What a hook reported.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// The hook ran and returned a value
    Returned(Value),
    /// The backend does not define the (optional) hook
    Missing,
    /// The hook raised `NotImplementedError`
    Unsupported,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HookOutput {
    return_val: Option<Value>,
    unsupported: bool,
    hook_missing: bool,
    traceback: Option<String>,
}

/// Runs backend hooks for one source tree.
pub struct HookCaller<'a> {
    runner: &'a dyn CommandRunner,
    python: &'a Path,
    source_dir: &'a Path,
    backend: &'a str,
    env: HashMap<String, String>,
    temp_root: Option<&'a Path>,
}

impl<'a> HookCaller<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        python: &'a Path,
        source_dir: &'a Path,
        backend: &'a str,
        temp_root: Option<&'a Path>,
    ) -> Self {
        HookCaller {
            runner,
            python,
            source_dir,
            backend,
            env: HashMap::new(),
            temp_root,
        }
    }

    /// Add environment variables for every hook invocation.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// The backend this caller invokes.
    pub fn backend(&self) -> &str {
        self.backend
    }

    fn failure(&self, message: String) -> anyhow::Error {
        ProjectError::BuildFailure {
            backend: self.backend.to_string(),
            message,
        }
        .into()
    }

    /// Run `hook` with keyword arguments `kwargs`.
    ///
    /// Every hook invocation goes through here, under one spinner.
    pub fn run_hook(&self, hook: &str, kwargs: Value, message: &str) -> Result<HookOutcome> {
        let control = TempDirectory::new("hook", self.temp_root)?;
        let script = control.join(IN_PROCESS_NAME);
        crate::util::fs::write_string(&script, IN_PROCESS_SCRIPT)?;
        crate::util::fs::write_string(
            &control.join("input.json"),
            &serde_json::to_string(&json!({ "kwargs": kwargs }))?,
        )?;

        let argv = vec![
            self.python.to_string_lossy().into_owned(),
            script.to_string_lossy().into_owned(),
            hook.to_string(),
            control.path().to_string_lossy().into_owned(),
        ];
        let mut env = self.env.clone();
        env.insert(BACKEND_ENV.to_string(), self.backend.to_string());

        tracing::debug!("Calling {} of backend `{}`", hook, self.backend);
        let spinner = Spinner::open(message);
        let result = self.runner.run(&argv, Some(self.source_dir), &env);
        let output = read_output(control.path());

        if let Err(e) = result {
            let detail = output
                .ok()
                .and_then(|o| o.traceback)
                .unwrap_or_else(|| format!("{:#}", e));
            return Err(self.failure(format!("hook `{}` failed:\n{}", hook, detail)));
        }
        spinner.finish();

        let output = output.with_context(|| format!("hook `{}` wrote no output", hook))?;
        if output.hook_missing {
            return Ok(HookOutcome::Missing);
        }
        if output.unsupported {
            return Ok(HookOutcome::Unsupported);
        }
        if let Some(traceback) = output.traceback {
            return Err(self.failure(format!("hook `{}` failed:\n{}", hook, traceback)));
        }
        Ok(HookOutcome::Returned(output.return_val.unwrap_or(Value::Null)))
    }
}

fn read_output(control: &Path) -> Result<HookOutput> {
    let path = control.join("output.json");
    let text = crate::util::fs::read_to_string(&path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid hook output in {}", path.display()))
}
