//! The lazily-advancing project façade.
//!
//! A [`Project`] answers queries by asking its current state and, when the
//! state cannot answer, advancing to the next state and asking again. Every
//! visited state is kept, so temporary directories created along the way
//! live as long as the project.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::requirement::canonicalize_name;
use crate::core::{Metadata, Scheme, TargetTags};
use crate::project::state::{ProjectInterface, ProjectState, StateKind};
use crate::project::{ProjectError, Query};

/// A project being prepared for installation.
#[derive(Debug)]
pub struct Project {
    states: Vec<ProjectState>,
    resolved: HashMap<&'static str, String>,
}

impl Project {
    /// Create a project in `initial`.
    pub fn new(initial: ProjectState) -> Self {
        Project {
            states: vec![initial],
            resolved: HashMap::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> &ProjectState {
        // Never empty: `new` pushes the initial state and states are only added
        &self.states[self.states.len() - 1]
    }

    /// The kinds of every visited state, oldest first.
    pub fn history(&self) -> Vec<StateKind> {
        self.states.iter().map(ProjectState::kind).collect()
    }

    /// The history as `A -> B -> C`.
    pub fn history_string(&self) -> String {
        self.history()
            .iter()
            .map(StateKind::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Move to the next state, or fail if the current one is terminal.
    fn advance(&mut self, operation: &'static str) -> Result<()> {
        let current = self.state();
        let from = current.kind();
        if current.is_terminal() {
            return Err(ProjectError::UnsupportedOperation {
                operation,
                state: from,
                history: self.history_string(),
            }
            .into());
        }

        let next = current
            .as_interface()
            .advance()
            .with_context(|| format!("failed to advance {} for `{}`", self, operation))?;
        let to = next.kind();
        if self.states.iter().any(|s| s.kind() == to) {
            return Err(ProjectError::NonMonotonicTransition { from, to }.into());
        }

        tracing::debug!("{}: {} -> {}", operation, from, to);
        self.states.push(next);
        Ok(())
    }

    /// Ask the current state, advancing until it answers.
    fn drive<T>(
        &mut self,
        operation: &'static str,
        mut query: impl FnMut(&dyn ProjectInterface) -> Result<Query<T>>,
    ) -> Result<T> {
        loop {
            let answer = query(self.state().as_interface())
                .with_context(|| format!("`{}` failed for {}", operation, self))?;
            match answer {
                Query::Answered(value) => return Ok(value),
                Query::NeedsAdvance => self.advance(operation)?,
            }
        }
    }

    /// Resolve a scalar that must not change between states.
    fn resolve(
        &mut self,
        property: &'static str,
        query: impl FnMut(&dyn ProjectInterface) -> Result<Query<String>>,
    ) -> Result<String> {
        let current = self.drive(property, query)?;
        let Some(previous) = self.resolved.get(property) else {
            self.resolved.insert(property, current.clone());
            return Ok(current);
        };

        let consistent = match property {
            "name" => canonicalize_name(previous) == canonicalize_name(&current),
            _ => *previous == current,
        };
        if !consistent {
            return Err(ProjectError::ConsistencyViolation {
                property,
                previous: previous.clone(),
                current,
                history: self.history_string(),
            }
            .into());
        }
        Ok(previous.clone())
    }

    /// The project name.
    pub fn name(&mut self) -> Result<String> {
        self.resolve("name", |s| s.name())
    }

    /// The project version.
    pub fn version(&mut self) -> Result<String> {
        self.resolve("version", |s| s.version())
    }

    /// The declared runtime dependencies.
    pub fn dependencies(&mut self) -> Result<Vec<String>> {
        self.drive("dependencies", |s| s.dependencies())
    }

    /// The core metadata.
    pub fn metadata(&mut self) -> Result<Metadata> {
        self.drive("metadata", |s| s.metadata())
    }

    /// Whether the project can be installed for `tags`.
    pub fn is_compatible(&mut self, tags: &TargetTags) -> Result<bool> {
        self.drive("is_compatible", |s| s.is_compatible(tags))
    }

    /// Install into `scheme`.
    pub fn install(&mut self, scheme: &Scheme) -> Result<()> {
        self.drive("install", |s| s.install(scheme))
    }

    /// Remove an installation from `scheme`.
    pub fn uninstall(&mut self, scheme: &Scheme) -> Result<()> {
        self.drive("uninstall", |s| s.uninstall(scheme))
    }

    /// Copy the source distribution into `dir`.
    pub fn save_sdist(&mut self, dir: &Path) -> Result<PathBuf> {
        self.drive("save_sdist", |s| s.save_sdist(dir))
    }

    /// Copy (building if needed) the wheel into `dir`.
    pub fn save_wheel(&mut self, dir: &Path) -> Result<PathBuf> {
        self.drive("save_wheel", |s| s.save_wheel(dir))
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Project({})", self.history_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_requirement, Link, ParsedRequirement, RequirementOptions};
    use crate::project::{ProjectConfig, ProjectFactory};
    use crate::test_support::{fake_services, fixtures, FakeRunner, Fakes};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Setup {
        tmp: TempDir,
        fakes: Fakes,
        factory: ProjectFactory,
    }

    impl Setup {
        fn new(config: ProjectConfig, runner: FakeRunner) -> Self {
            let tmp = TempDir::new().unwrap();
            let fixture_dir = tmp.path().join("fixtures");
            std::fs::create_dir_all(&fixture_dir).unwrap();
            let (services, fakes) = fake_services(&fixture_dir);
            let runner = Arc::new(runner);
            let services = services.with_runner(runner.clone());
            let fakes = Fakes { runner, ..fakes };
            let config = ProjectConfig {
                temp_root: Some(tmp.path().to_path_buf()),
                src_dir: tmp.path().join("checkouts"),
                ..config
            };
            let factory = ProjectFactory::new(config, services).unwrap();
            Setup {
                tmp,
                fakes,
                factory,
            }
        }

        fn fixtures(&self) -> PathBuf {
            self.tmp.path().join("fixtures")
        }

        fn src_dir(&self) -> PathBuf {
            self.tmp.path().join("checkouts")
        }

        fn scheme(&self) -> Scheme {
            Scheme::for_prefix(&self.tmp.path().join("env"), fixtures::FAKE_PYTHON_VERSION)
        }

        fn project(&self, input: &str) -> Project {
            self.factory.from_requirement(&parse(input, false)).unwrap()
        }
    }

    fn parse(input: &str, editable: bool) -> ParsedRequirement {
        parse_requirement(input, "test", editable, false, RequirementOptions::default()).unwrap()
    }

    fn project_error(err: &anyhow::Error) -> &ProjectError {
        err.downcast_ref::<ProjectError>()
            .unwrap_or_else(|| panic!("not a project error: {:#}", err))
    }

    #[test]
    fn test_legacy_directory_installs_through_wheel() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let dir = setup.tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");

        let mut project = setup.project(&dir.to_string_lossy());
        project.install(&setup.scheme()).unwrap();

        assert_eq!(
            project.history(),
            vec![
                StateKind::LocalNonEditableDirectory,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
                StateKind::LocalWheel,
                StateKind::UnpackedWheel,
            ]
        );
        assert!(setup.scheme().purelib.join("example-0.1.0.dist-info").is_dir());
        assert!(setup.scheme().purelib.join("example/__init__.py").is_file());
        assert_eq!(
            project.to_string(),
            "Project(LocalNonEditableDirectory -> UnpackedSources -> LegacyProject -> \
             LocalWheel -> UnpackedWheel)"
        );
    }

    #[test]
    fn test_disabled_wheel_builds_install_directly() {
        let config = ProjectConfig {
            legacy_wheel_builds: false,
            ..ProjectConfig::default()
        };
        let setup = Setup::new(config, FakeRunner::new("example", "0.1.0"));
        let dir = setup.tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");

        let mut project = setup.project(&dir.to_string_lossy());
        project.install(&setup.scheme()).unwrap();

        assert_eq!(
            project.state().kind(),
            StateKind::LegacyNonWheelProject
        );
        assert!(setup.fakes.runner.ran("install"));
        assert!(!setup.fakes.runner.ran("bdist_wheel"));

        // The recorded files make the installation removable
        project.uninstall(&setup.scheme()).unwrap();
        assert!(!setup.scheme().purelib.join("example/__init__.py").exists());
    }

    #[test]
    fn test_failed_wheel_build_falls_back() {
        let setup = Setup::new(
            ProjectConfig::default(),
            FakeRunner::new("example", "0.1.0").failing_wheel(),
        );
        let dir = setup.tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");

        let mut project = setup.project(&dir.to_string_lossy());
        project.install(&setup.scheme()).unwrap();
        assert_eq!(project.state().kind(), StateKind::LegacyNonWheelProject);
        assert!(setup.fakes.runner.ran("bdist_wheel"));
    }

    #[test]
    fn test_wheel_answers_without_advancing() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = fixtures::write_wheel(&setup.fixtures(), "example", "0.1.0", &[]);

        let mut project = setup.project(&wheel.to_string_lossy());
        assert_eq!(project.name().unwrap(), "example");
        assert_eq!(project.version().unwrap(), "0.1.0");
        assert_eq!(project.history(), vec![StateKind::LocalWheel]);
    }

    #[test]
    fn test_wheel_dependencies_read_from_archive() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = fixtures::write_wheel(
            &setup.fixtures(),
            "example",
            "0.1.0",
            &["requests>=2.0", "click"],
        );

        let mut project = setup.project(&wheel.to_string_lossy());
        assert_eq!(project.dependencies().unwrap(), vec!["requests>=2.0", "click"]);
        assert_eq!(project.history(), vec![StateKind::LocalWheel]);
    }

    #[test]
    fn test_divergent_metadata_is_a_consistency_violation() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = setup.fixtures().join("example-0.1.0-py3-none-any.whl");
        fixtures::write_wheel_as(&wheel, "other", "0.1.0", &[]);

        let mut project = setup.project(&wheel.to_string_lossy());
        assert_eq!(project.name().unwrap(), "example");
        project.install(&setup.scheme()).unwrap();

        let err = project.name().unwrap_err();
        match project_error(&err) {
            ProjectError::ConsistencyViolation {
                property,
                previous,
                current,
                history,
            } => {
                assert_eq!(*property, "name");
                assert_eq!(previous, "example");
                assert_eq!(current, "other");
                assert_eq!(history, "LocalWheel -> UnpackedWheel");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_name_compared_canonically() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = setup.fixtures().join("my_pkg-0.1.0-py3-none-any.whl");
        fixtures::write_wheel_as(&wheel, "My.Pkg", "0.1.0", &[]);

        let mut project = setup.project(&wheel.to_string_lossy());
        assert_eq!(project.name().unwrap(), "my-pkg");
        project.install(&setup.scheme()).unwrap();
        assert_eq!(project.name().unwrap(), "my-pkg");
    }

    #[test]
    fn test_terminal_state_rejects_unsupported_operation() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = fixtures::write_wheel(&setup.fixtures(), "example", "0.1.0", &[]);

        let mut project = setup.project(&wheel.to_string_lossy());
        project.install(&setup.scheme()).unwrap();

        let err = project.save_sdist(&setup.tmp.path().join("out")).unwrap_err();
        match project_error(&err) {
            ProjectError::UnsupportedOperation { operation, state, .. } => {
                assert_eq!(*operation, "save_sdist");
                assert_eq!(*state, StateKind::UnpackedWheel);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_install_and_uninstall_wheel() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = fixtures::write_wheel(&setup.fixtures(), "example", "0.1.0", &[]);
        let scheme = setup.scheme();

        let mut project = setup.project(&wheel.to_string_lossy());
        project.install(&scheme).unwrap();
        let dist_info = scheme.purelib.join("example-0.1.0.dist-info");
        assert!(dist_info.join("RECORD").is_file());
        assert!(dist_info.join("INSTALLER").is_file());

        project.uninstall(&scheme).unwrap();
        assert!(!dist_info.exists());
        assert!(!scheme.purelib.join("example").exists());
    }

    #[test]
    fn test_remote_wheel_tag_mismatch_skips_download() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let mut project = setup.project(
            "https://files.example.com/example-0.1.0-cp27-cp27mu-manylinux1_x86_64.whl",
        );

        let tags = TargetTags::pure_python(11);
        assert!(!project.is_compatible(&tags).unwrap());
        assert_eq!(project.history(), vec![StateKind::RemoteWheel]);
        assert!(setup.fakes.downloader.calls().is_empty());
    }

    #[test]
    fn test_remote_wheel_downloads_to_confirm() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        fixtures::write_wheel(&setup.fixtures(), "example", "0.1.0", &[]);
        let mut project =
            setup.project("https://files.example.com/example-0.1.0-py3-none-any.whl");

        assert!(project.is_compatible(&TargetTags::pure_python(11)).unwrap());
        assert_eq!(
            project.history(),
            vec![StateKind::RemoteWheel, StateKind::LocalWheel]
        );
        assert_eq!(setup.fakes.downloader.calls().len(), 1);
    }

    #[test]
    fn test_remote_sdist_saves_without_unpacking() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let src = setup.tmp.path().join("src");
        fixtures::write_legacy_project(&src, "example");
        fixtures::write_sdist(&src, &setup.fixtures().join("example-0.1.0.tar.gz"), "example-0.1.0");

        let mut project =
            setup.project("example @ https://files.example.com/example-0.1.0.tar.gz");
        assert_eq!(project.version().unwrap(), "0.1.0");
        assert_eq!(project.history(), vec![StateKind::RemoteSdist]);

        let out = setup.tmp.path().join("out");
        let saved = project.save_sdist(&out).unwrap();
        assert_eq!(saved, out.join("example-0.1.0.tar.gz"));
        assert_eq!(
            project.history(),
            vec![StateKind::RemoteSdist, StateKind::LocalSdist]
        );
    }

    #[test]
    fn test_sdist_unpacks_to_legacy_project() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let src = setup.tmp.path().join("src");
        fixtures::write_legacy_project(&src, "example");
        let archive = setup.fixtures().join("example-0.1.0.tar.gz");
        fixtures::write_sdist(&src, &archive, "example-0.1.0");

        let mut project = setup.project(&archive.to_string_lossy());
        assert_eq!(project.dependencies().unwrap(), Vec::<String>::new());
        assert_eq!(
            project.history(),
            vec![
                StateKind::LocalArchive,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
            ]
        );
        assert!(setup.fakes.runner.ran("egg_info"));
    }

    #[test]
    fn test_remote_archive_installs_through_wheel() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let src = setup.tmp.path().join("src");
        fixtures::write_legacy_project(&src, "example");
        fixtures::write_sdist(&src, &setup.fixtures().join("example-0.1.0.tar.gz"), "example-0.1.0");

        let mut project = setup.project("https://files.example.com/example-0.1.0.tar.gz");
        assert_eq!(project.history(), vec![StateKind::RemoteArchive]);
        project.install(&setup.scheme()).unwrap();

        assert_eq!(
            project.history(),
            vec![
                StateKind::RemoteArchive,
                StateKind::LocalArchive,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
                StateKind::LocalWheel,
                StateKind::UnpackedWheel,
            ]
        );
        assert_eq!(
            setup.fakes.downloader.calls(),
            vec!["https://files.example.com/example-0.1.0.tar.gz".to_string()]
        );
        assert!(setup.scheme().purelib.join("example-0.1.0.dist-info").is_dir());
    }

    #[test]
    fn test_legacy_directory_answers_without_building() {
        let runner = FakeRunner::new("example", "0.2.0").with_requires(&["six"]);
        let setup = Setup::new(ProjectConfig::default(), runner);
        let dir = setup.tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");

        let mut project = setup.project(&dir.to_string_lossy());
        assert_eq!(project.name().unwrap(), "example");
        assert_eq!(project.state().kind(), StateKind::LegacyProject);
        assert_eq!(project.version().unwrap(), "0.2.0");
        assert_eq!(project.dependencies().unwrap(), vec!["six".to_string()]);
        assert_eq!(project.state().kind(), StateKind::LegacyProject);
        assert!(!setup.fakes.runner.ran("bdist_wheel"));
    }

    #[test]
    fn test_modern_backend_without_metadata_hook_builds_wheel() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let dir = setup.tmp.path().join("example");
        fixtures::write_modern_project(&dir, "flit_core.buildapi");

        let mut project = setup.project(&dir.to_string_lossy());
        assert_eq!(project.name().unwrap(), "example");
        assert_eq!(
            project.history(),
            vec![
                StateKind::LocalNonEditableDirectory,
                StateKind::UnpackedSources,
                StateKind::ModernProject,
                StateKind::LocalWheel,
            ]
        );
        assert!(setup.fakes.runner.ran("prepare_metadata_for_build_wheel"));
        assert!(setup.fakes.runner.ran("build_wheel"));
    }

    #[test]
    fn test_modern_backend_metadata_hook_answers_in_place() {
        let setup = Setup::new(
            ProjectConfig::default(),
            FakeRunner::new("example", "0.1.0")
                .with_requires(&["attrs"])
                .with_metadata_hook(),
        );
        let dir = setup.tmp.path().join("example");
        fixtures::write_modern_project(&dir, "flit_core.buildapi");

        let mut project = setup.project(&dir.to_string_lossy());
        assert_eq!(project.dependencies().unwrap(), vec!["attrs"]);
        assert_eq!(project.state().kind(), StateKind::ModernProject);
        assert!(!setup.fakes.runner.ran("build_wheel"));
    }

    #[test]
    fn test_missing_build_requirements() {
        let tmp = TempDir::new().unwrap();
        let (services, _) = fake_services(tmp.path());
        let services = services.with_build_env(Arc::new(
            crate::test_support::FakeBuildEnvironment::with_missing(&["setuptools>=40.8.0"]),
        ));
        let factory = ProjectFactory::new(ProjectConfig::default(), services).unwrap();
        let dir = tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");
        // No build-backend: the implicit setuptools backend must be present
        std::fs::write(
            dir.join("pyproject.toml"),
            "[build-system]\nrequires = [\"setuptools>=40.8.0\", \"wheel\"]\n",
        )
        .unwrap();

        let mut project = factory
            .from_requirement(&parse(&dir.to_string_lossy(), false))
            .unwrap();
        let err = project.save_wheel(&tmp.path().join("out")).unwrap_err();
        match project_error(&err) {
            ProjectError::MissingBuildRequirements { missing } => {
                assert_eq!(missing, &vec!["setuptools>=40.8.0".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_editable_directory_develops() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let dir = setup.tmp.path().join("example");
        fixtures::write_legacy_project(&dir, "example");
        let scheme = setup.scheme();

        let mut project = setup
            .factory
            .from_requirement(&parse(&dir.to_string_lossy(), true))
            .unwrap();
        project.install(&scheme).unwrap();
        assert_eq!(
            project.history(),
            vec![
                StateKind::LocalEditableDirectory,
                StateKind::LocalEditableLegacy
            ]
        );
        assert!(scheme.purelib.join("example.egg-link").is_file());

        project.uninstall(&scheme).unwrap();
        assert!(!scheme.purelib.join("example.egg-link").exists());
    }

    #[test]
    fn test_editable_directory_requires_setup_py() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let dir = setup.tmp.path().join("example");
        fixtures::write_modern_project(&dir, "flit_core.buildapi");

        let mut project = setup
            .factory
            .from_requirement(&parse(&dir.to_string_lossy(), true))
            .unwrap();
        let err = project.name().unwrap_err();
        assert!(matches!(
            project_error(&err),
            ProjectError::MalformedSource { .. }
        ));
    }

    #[test]
    fn test_named_vcs_checkout() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        fixtures::write_legacy_project(&setup.fixtures().join("repo"), "example");

        let mut project = setup.project("git+https://example.com/repo.git@v1#egg=example");
        assert_eq!(project.name().unwrap(), "example");
        assert_eq!(project.history(), vec![StateKind::RemoteNamedVcs]);

        assert_eq!(project.version().unwrap(), "0.1.0");
        assert_eq!(
            project.history(),
            vec![
                StateKind::RemoteNamedVcs,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
            ]
        );
    }

    #[test]
    fn test_unnamed_vcs_checkout() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        fixtures::write_legacy_project(&setup.fixtures().join("repo"), "example");

        let mut project = setup.project("git+https://example.com/repo.git");
        assert_eq!(project.history(), vec![StateKind::RemoteUnnamedVcs]);

        assert_eq!(project.name().unwrap(), "example");
        assert_eq!(
            project.history(),
            vec![
                StateKind::RemoteUnnamedVcs,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
            ]
        );
    }

    #[test]
    fn test_local_vcs_checkouts() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let repo = setup.fixtures().join("repo");
        fixtures::write_legacy_project(&repo, "example");
        let url = format!("git+{}", Link::from_path(&repo).unwrap());

        let mut named = setup.project(&format!("{}#egg=example", url));
        assert_eq!(named.name().unwrap(), "example");
        assert_eq!(named.history(), vec![StateKind::LocalNamedVcs]);
        assert_eq!(named.version().unwrap(), "0.1.0");
        assert_eq!(
            named.history(),
            vec![
                StateKind::LocalNamedVcs,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
            ]
        );

        let mut unnamed = setup.project(&url);
        assert_eq!(unnamed.name().unwrap(), "example");
        assert_eq!(
            unnamed.history(),
            vec![
                StateKind::LocalUnnamedVcs,
                StateKind::UnpackedSources,
                StateKind::LegacyProject,
            ]
        );
    }

    #[test]
    fn test_editable_remote_vcs_checks_out_into_src_dir() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        fixtures::write_legacy_project(&setup.fixtures().join("repo"), "example");
        let scheme = setup.scheme();

        let mut project = setup
            .factory
            .from_requirement(&parse("git+https://example.com/repo.git#egg=Example", true))
            .unwrap();
        project.install(&scheme).unwrap();

        assert_eq!(
            project.history(),
            vec![
                StateKind::RemoteEditableNamedVcs,
                StateKind::LocalEditableNamedVcs,
                StateKind::LocalEditableLegacy,
            ]
        );
        let checkout = setup.src_dir().join("example");
        assert!(checkout.join("setup.py").is_file());

        let egg_link = std::fs::read_to_string(scheme.purelib.join("example.egg-link")).unwrap();
        assert_eq!(egg_link.lines().next(), Some(checkout.to_string_lossy().as_ref()));
    }

    #[test]
    fn test_subdirectory_fragment_must_exist() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        fixtures::write_legacy_project(&setup.fixtures().join("repo"), "example");

        let mut project =
            setup.project("git+https://example.com/repo.git#egg=example&subdirectory=missing");
        let err = project.version().unwrap_err();
        assert!(matches!(
            project_error(&err),
            ProjectError::MalformedSource { .. }
        ));
    }

    #[test]
    fn test_local_link_round_trips_through_file_url() {
        let setup = Setup::new(ProjectConfig::default(), FakeRunner::new("example", "0.1.0"));
        let wheel = fixtures::write_wheel(&setup.fixtures(), "example", "0.1.0", &[]);
        let url = Link::from_path(&wheel).unwrap().to_string();

        let mut project = setup.project(&url);
        let saved = project.save_wheel(&setup.tmp.path().join("out")).unwrap();
        assert!(saved.is_file());
    }
}
