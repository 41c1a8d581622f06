//! Legacy builds through `setup.py`.
//!
//! Every invocation goes through the setuptools shim, which runs `setup.py`
//! with setuptools imported (or a bare `setup()` if the file is missing).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{Metadata, ParsedRequirement, Scheme};
use crate::project::{ProjectContext, ProjectError};
use crate::util::fs::find_single_with_suffix;
use crate::util::{Spinner, TempDirectory};

/// Name of the backend in build failures.
pub const BACKEND_NAME: &str = "setuptools";

/// Render a path as a Python string literal.
fn py_repr(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// The `-c` program that runs `setup_py` under setuptools.
pub fn setuptools_shim(setup_py: &Path) -> String {
    let path = py_repr(&setup_py.to_string_lossy());
    format!(
        "import io, os, sys, setuptools, tokenize; sys.argv[0] = {path}; __file__ = {path}; \
         f = getattr(tokenize, 'open', open)(__file__) if os.path.exists(__file__) \
         else io.StringIO('from setuptools import setup; setup()'); \
         code = f.read().replace('\\r\\n', '\\n'); f.close(); \
         exec(compile(code, __file__, 'exec'))"
    )
}

/// Builds `setup.py` command lines.
#[derive(Debug, Clone)]
pub struct SetuptoolsArgs<'a> {
    python: &'a Path,
    setup_py: PathBuf,
    global_options: &'a [String],
    isolated: bool,
}

impl<'a> SetuptoolsArgs<'a> {
    /// Create an argument builder.
    pub fn new(
        python: &'a Path,
        setup_py: PathBuf,
        global_options: &'a [String],
        isolated: bool,
    ) -> Self {
        SetuptoolsArgs {
            python,
            setup_py,
            global_options,
            isolated,
        }
    }

    fn base(&self) -> Vec<String> {
        let mut args = vec![
            self.python.to_string_lossy().into_owned(),
            "-u".to_string(),
            "-c".to_string(),
            setuptools_shim(&self.setup_py),
        ];
        args.extend(self.global_options.iter().cloned());
        if self.isolated {
            args.push("--no-user-cfg".to_string());
        }
        args
    }

    /// `egg_info --egg-base DIR`
    pub fn egg_info_args(&self, egg_base: &Path) -> Vec<String> {
        let mut args = self.base();
        args.push("egg_info".to_string());
        args.push("--egg-base".to_string());
        args.push(egg_base.to_string_lossy().into_owned());
        args
    }

    /// `install --record R --single-version-externally-managed ...`
    pub fn install_args(
        &self,
        scheme: &Scheme,
        root: Option<&Path>,
        compile: bool,
        record: &Path,
        install_options: &[String],
    ) -> Vec<String> {
        let mut args = self.base();
        args.push("install".to_string());
        args.push("--record".to_string());
        args.push(record.to_string_lossy().into_owned());
        args.push("--single-version-externally-managed".to_string());
        if let Some(root) = root {
            args.push("--root".to_string());
            args.push(root.to_string_lossy().into_owned());
        }
        args.push("--prefix".to_string());
        args.push(scheme.prefix.to_string_lossy().into_owned());
        args.push(if compile { "--compile" } else { "--no-compile" }.to_string());
        args.push("--install-headers".to_string());
        args.push(scheme.headers.to_string_lossy().into_owned());
        args.extend(install_options.iter().cloned());
        args
    }

    /// `develop --no-deps <options> --prefix P`
    pub fn develop_args(&self, scheme: &Scheme, install_options: &[String]) -> Vec<String> {
        let mut args = self.base();
        args.push("develop".to_string());
        args.push("--no-deps".to_string());
        args.extend(install_options.iter().cloned());
        args.push("--prefix".to_string());
        args.push(scheme.prefix.to_string_lossy().into_owned());
        args
    }

    /// `bdist_wheel -d DEST [--python-tag T] <options>`
    pub fn wheel_args(
        &self,
        dest: &Path,
        python_tag: Option<&str>,
        build_options: &[String],
    ) -> Vec<String> {
        let mut args = self.base();
        args.push("bdist_wheel".to_string());
        args.push("-d".to_string());
        args.push(dest.to_string_lossy().into_owned());
        if let Some(tag) = python_tag {
            args.push("--python-tag".to_string());
            args.push(tag.to_string());
        }
        args.extend(build_options.iter().cloned());
        args
    }
}

/// Output of `setup.py egg_info`.
#[derive(Debug, Clone)]
pub struct EggInfo {
    /// Keeps the egg-base directory alive
    pub dir: TempDirectory,
    /// The `<name>.egg-info` directory
    pub path: PathBuf,
    pub metadata: Metadata,
}

/// Runs setuptools commands for one source tree.
pub struct LegacyBuilder<'a> {
    ctx: &'a ProjectContext,
    req: &'a ParsedRequirement,
    source_dir: &'a Path,
}

impl<'a> LegacyBuilder<'a> {
    pub fn new(ctx: &'a ProjectContext, req: &'a ParsedRequirement, source_dir: &'a Path) -> Self {
        LegacyBuilder {
            ctx,
            req,
            source_dir,
        }
    }

    /// The `setup.py` of the source tree.
    pub fn setup_py(&self) -> PathBuf {
        self.source_dir.join("setup.py")
    }

    fn args(&self) -> SetuptoolsArgs<'_> {
        SetuptoolsArgs::new(
            &self.ctx.config.python,
            self.setup_py(),
            &self.req.global_options,
            self.ctx.config.isolated,
        )
    }

    fn display_name(&self) -> String {
        match self.req.name() {
            Some(name) => name.to_string(),
            None => self.source_dir.display().to_string(),
        }
    }

    fn run(&self, message: String, argv: Vec<String>) -> Result<()> {
        tracing::debug!("Running {}", argv[4..].join(" "));
        let spinner = Spinner::open(message);
        self.ctx
            .services
            .runner
            .run(&argv, Some(self.source_dir), &Default::default())
            .map_err(|e| ProjectError::BuildFailure {
                backend: BACKEND_NAME.to_string(),
                message: format!("{:#}", e),
            })?;
        spinner.finish();
        Ok(())
    }

    /// Run `egg_info` into a fresh directory and load the metadata.
    pub fn egg_info(&self) -> Result<EggInfo> {
        let dir = self.ctx.temp_dir("egg-info")?;
        self.run(
            format!("Preparing metadata (setup.py) for {}", self.display_name()),
            self.args().egg_info_args(dir.path()),
        )?;

        let path = find_single_with_suffix(dir.path(), ".egg-info").map_err(|e| {
            ProjectError::MalformedSource {
                path: self.source_dir.to_path_buf(),
                reason: format!("setup.py egg_info produced no metadata: {}", e),
            }
        })?;
        let metadata = Metadata::load_egg_info(&path)?;
        tracing::debug!("Loaded metadata for {} {}", metadata.name, metadata.version);

        Ok(EggInfo {
            dir,
            path,
            metadata,
        })
    }

    /// Build a wheel into a fresh directory.
    pub fn build_wheel(&self) -> Result<(TempDirectory, PathBuf)> {
        let dir = self.ctx.temp_dir("wheel")?;
        self.run(
            format!("Building wheel for {} (setup.py)", self.display_name()),
            self.args().wheel_args(
                dir.path(),
                self.ctx.config.python_tag.as_deref(),
                &self.req.build_options,
            ),
        )?;

        let wheel = find_single_with_suffix(dir.path(), ".whl").map_err(|e| {
            ProjectError::BuildFailure {
                backend: BACKEND_NAME.to_string(),
                message: format!("bdist_wheel produced no wheel: {}", e),
            }
        })?;
        tracing::info!("Built {}", wheel.display());
        Ok((dir, wheel))
    }

    /// Run `install --record` and record the installed files next to the
    /// installed egg-info so the project can be uninstalled.
    pub fn install(&self, scheme: &Scheme, name: &str) -> Result<()> {
        let scheme = Scheme {
            headers: scheme.headers.join(name),
            ..scheme.clone()
        };
        let record_dir = self.ctx.temp_dir("record")?;
        let record = record_dir.join("install-record.txt");
        let root = self.ctx.config.root.as_deref();

        self.run(
            format!("Running setup.py install for {}", name),
            self.args().install_args(
                &scheme,
                root,
                self.ctx.config.compile_bytecode,
                &record,
                &self.req.install_options,
            ),
        )?;

        crate::install::record_legacy_install(&record, root)
            .with_context(|| format!("failed to record installation of {}", name))?;
        tracing::info!("Installed {}", name);
        Ok(())
    }

    /// Run `develop` to install the source tree in place.
    pub fn develop(&self, scheme: &Scheme, name: &str) -> Result<()> {
        self.run(
            format!("Running setup.py develop for {}", name),
            self.args()
                .develop_args(scheme, &self.req.install_options),
        )?;
        tracing::info!("Installed {} in editable mode", name);
        Ok(())
    }
}
