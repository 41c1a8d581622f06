//! Immutable configuration shared by every project state.

use std::path::PathBuf;

/// Options that influence how projects are prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Run setup scripts with `--no-user-cfg`
    pub isolated: bool,

    /// Standardized-build preference; `None` auto-detects from the source tree
    pub use_pep517: Option<bool>,

    /// Whether legacy projects may be built into wheels
    pub legacy_wheel_builds: bool,

    /// Interpreter used for every build invocation
    pub python: PathBuf,

    /// Byte-compile modules during legacy installs
    pub compile_bytecode: bool,

    /// Alternate root directory for legacy installs
    pub root: Option<PathBuf>,

    /// Checkout location for editable VCS requirements
    pub src_dir: PathBuf,

    /// Python tag passed to legacy wheel builds
    pub python_tag: Option<String>,

    /// Parent directory for temporary directories (system default if unset)
    pub temp_root: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            isolated: false,
            use_pep517: None,
            legacy_wheel_builds: true,
            python: PathBuf::from("python3"),
            compile_bytecode: true,
            root: None,
            src_dir: PathBuf::from("src"),
            python_tag: None,
            temp_root: None,
        }
    }
}
