//! Fakes for the project services, for unit tests.
//!
//! The fakes never touch the network, Python or git. `FakeRunner` emulates
//! just enough of `setup.py` and the in-process hook script to drive every
//! state transition.
//!
//! # Example
//!
//! ```rust,ignore
//! let (services, fakes) = fake_services(&fixture_dir);
//! let factory = ProjectFactory::new(ProjectConfig::default(), services)?;
//! let mut project = factory.from_requirement(&req)?;
//! project.install(&scheme)?;
//! assert!(fakes.runner.ran("bdist_wheel"));
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::core::Link;
use crate::project::{BuildEnvironment, CommandRunner, Downloader, ProjectServices, VcsCheckout};
use crate::sources::ArchiveUnpacker;
use crate::util::fs::copy_dir_all;

pub use fixtures::FAKE_PYTHON_VERSION;

/// Emulates `setup.py` commands and build-backend hooks.
///
/// Every project it "builds" is `name` `version` requiring `requires`,
/// whatever the source tree says.
#[derive(Debug)]
pub struct FakeRunner {
    name: String,
    version: String,
    requires: Vec<String>,
    fail_wheel: bool,
    metadata_hook: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(name: &str, version: &str) -> Self {
        FakeRunner {
            name: name.to_string(),
            version: version.to_string(),
            requires: Vec::new(),
            fail_wheel: false,
            metadata_hook: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Declare runtime requirements.
    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires = requires.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Make `bdist_wheel` fail.
    pub fn failing_wheel(mut self) -> Self {
        self.fail_wheel = true;
        self
    }

    /// Implement `prepare_metadata_for_build_wheel`.
    pub fn with_metadata_hook(mut self) -> Self {
        self.metadata_hook = true;
        self
    }

    /// Every argv run so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any invocation had `command` as an argument.
    pub fn ran(&self, command: &str) -> bool {
        self.calls()
            .iter()
            .any(|argv| argv.iter().any(|arg| arg == command))
    }

    fn requires(&self) -> Vec<&str> {
        self.requires.iter().map(String::as_str).collect()
    }

    fn site_packages(prefix: &Path) -> PathBuf {
        prefix
            .join("lib")
            .join(format!("python{}", FAKE_PYTHON_VERSION))
            .join("site-packages")
    }

    fn egg_info(&self, egg_base: &Path) -> Result<()> {
        let dir = egg_base.join(format!("{}.egg-info", self.name.replace('-', "_")));
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("PKG-INFO"),
            fixtures::metadata_text(&self.name, &self.version, &[]),
        )?;
        fs::write(dir.join("requires.txt"), self.requires.join("\n"))?;
        Ok(())
    }

    fn bdist_wheel(&self, dest: &Path) -> Result<PathBuf> {
        if self.fail_wheel {
            bail!("error: invalid command 'bdist_wheel'");
        }
        Ok(fixtures::write_wheel(
            dest,
            &self.name,
            &self.version,
            &self.requires(),
        ))
    }

    fn install(&self, record: &Path, prefix: &Path) -> Result<()> {
        let site = Self::site_packages(prefix);
        let module = site.join(fixtures::module_name(&self.name));
        let egg_info = site.join(format!(
            "{}-{}-py{}.egg-info",
            self.name.replace('-', "_"),
            self.version,
            FAKE_PYTHON_VERSION
        ));
        fs::create_dir_all(&module)?;
        fs::create_dir_all(&egg_info)?;

        let init = module.join("__init__.py");
        let pkg_info = egg_info.join("PKG-INFO");
        fs::write(&init, "")?;
        fs::write(
            &pkg_info,
            fixtures::metadata_text(&self.name, &self.version, &[]),
        )?;

        let lines: Vec<String> = [init, pkg_info]
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        fs::write(record, lines.join("\n") + "\n")?;
        Ok(())
    }

    fn develop(&self, source: &Path, prefix: &Path) -> Result<()> {
        let site = Self::site_packages(prefix);
        fs::create_dir_all(&site)?;
        let source = source.to_string_lossy();
        fs::write(
            site.join(format!("{}.egg-link", self.name)),
            format!("{}\n.\n", source),
        )?;
        fs::write(site.join("easy-install.pth"), format!("{}\n", source))?;
        Ok(())
    }

    fn hook(&self, hook: &str, control: &Path) -> Result<()> {
        let input: Value = serde_json::from_str(&fs::read_to_string(control.join("input.json"))?)?;
        let kwargs = &input["kwargs"];
        let dir_arg = |key: &str| -> Result<PathBuf> {
            kwargs[key]
                .as_str()
                .map(PathBuf::from)
                .with_context(|| format!("hook input has no `{}`", key))
        };

        let output = match hook {
            "prepare_metadata_for_build_wheel" if !self.metadata_hook => {
                json!({ "hook_missing": true })
            }
            "prepare_metadata_for_build_wheel" => {
                let name = fixtures::dist_info_name(&self.name, &self.version);
                let dir = dir_arg("metadata_directory")?.join(&name);
                fs::create_dir_all(&dir)?;
                fs::write(
                    dir.join("METADATA"),
                    fixtures::metadata_text(&self.name, &self.version, &self.requires()),
                )?;
                json!({ "return_val": name })
            }
            "build_wheel" => {
                let wheel = fixtures::write_wheel(
                    &dir_arg("wheel_directory")?,
                    &self.name,
                    &self.version,
                    &self.requires(),
                );
                let filename = wheel
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                json!({ "return_val": filename })
            }
            _ => json!({ "return_val": [] }),
        };
        fs::write(control.join("output.json"), output.to_string())?;
        Ok(())
    }
}

fn option_value<'a>(argv: &'a [String], flag: &str) -> Result<&'a Path> {
    argv.iter()
        .position(|arg| arg == flag)
        .and_then(|at| argv.get(at + 1))
        .map(Path::new)
        .with_context(|| format!("missing `{}`", flag))
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        argv: &[String],
        cwd: Option<&Path>,
        _env: &HashMap<String, String>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(argv.to_vec());

        if argv.get(1).is_some_and(|a| a.ends_with("_in_process.py")) {
            let control = argv.get(3).context("missing control directory")?;
            return self.hook(&argv[2], Path::new(control));
        }

        let command = argv
            .iter()
            .skip(4)
            .find(|arg| matches!(arg.as_str(), "egg_info" | "bdist_wheel" | "install" | "develop"));
        match command.map(String::as_str) {
            Some("egg_info") => self.egg_info(option_value(argv, "--egg-base")?),
            Some("bdist_wheel") => self.bdist_wheel(option_value(argv, "-d")?).map(drop),
            Some("install") => {
                self.install(option_value(argv, "--record")?, option_value(argv, "--prefix")?)
            }
            Some("develop") => self.develop(
                cwd.context("develop needs a working directory")?,
                option_value(argv, "--prefix")?,
            ),
            _ => Ok(()),
        }
    }
}

/// Serves downloads from files in a fixture directory, by link filename.
#[derive(Debug)]
pub struct FakeDownloader {
    root: PathBuf,
    calls: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn new(root: &Path) -> Self {
        FakeDownloader {
            root: root.to_path_buf(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// URLs downloaded so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, link: &Link, dest: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(link.url_without_fragment());
        let source = self.root.join(link.filename());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, dest)
            .with_context(|| format!("no fixture named {}", source.display()))?;
        Ok(())
    }
}

/// Checks out every link as a copy of one directory.
#[derive(Debug)]
pub struct FakeVcs {
    source: PathBuf,
}

impl FakeVcs {
    pub fn new(source: &Path) -> Self {
        FakeVcs {
            source: source.to_path_buf(),
        }
    }
}

impl VcsCheckout for FakeVcs {
    fn checkout(&self, _link: &Link, dest: &Path) -> Result<()> {
        copy_dir_all(&self.source, dest)
    }
}

/// A build environment where only the listed requirements are missing.
#[derive(Debug, Default)]
pub struct FakeBuildEnvironment {
    missing: Vec<String>,
}

impl FakeBuildEnvironment {
    pub fn with_missing(requirements: &[&str]) -> Self {
        FakeBuildEnvironment {
            missing: requirements.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BuildEnvironment for FakeBuildEnvironment {
    fn missing(&self, requirements: &[String]) -> Result<Vec<String>> {
        Ok(requirements
            .iter()
            .filter(|r| self.missing.contains(r))
            .cloned()
            .collect())
    }

    fn prepare(&self, _requirements: &[String]) -> Result<HashMap<String, String>> {
        Ok(HashMap::from([(
            "QUAY_FAKE_BUILD_ENV".to_string(),
            "1".to_string(),
        )]))
    }
}

/// Handles to the fakes inside a [`ProjectServices`].
#[derive(Debug, Clone)]
pub struct Fakes {
    pub runner: Arc<FakeRunner>,
    pub downloader: Arc<FakeDownloader>,
    pub vcs: Arc<FakeVcs>,
}

/// Services backed by fakes.
///
/// Downloads are served from `fixtures`, VCS checkouts copy
/// `fixtures/repo`, and the runner builds `example` 0.1.0. Archives are
/// unpacked for real.
pub fn fake_services(fixtures: &Path) -> (ProjectServices, Fakes) {
    let fakes = Fakes {
        runner: Arc::new(FakeRunner::new("example", "0.1.0")),
        downloader: Arc::new(FakeDownloader::new(fixtures)),
        vcs: Arc::new(FakeVcs::new(&fixtures.join("repo"))),
    };
    let services = ProjectServices {
        download: fakes.downloader.clone(),
        unpack: Arc::new(ArchiveUnpacker),
        runner: fakes.runner.clone(),
        vcs: fakes.vcs.clone(),
        build_env: Arc::new(FakeBuildEnvironment::default()),
    };
    (services, fakes)
}
