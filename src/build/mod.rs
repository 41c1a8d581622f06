//! Build backend adapters.
//!
//! - `legacy`: `setup.py` invocations through the setuptools shim
//! - `hooks` / `backend`: standardized backends called in a subprocess
//! - `pyproject`: choosing between the two for a source tree

pub mod backend;
pub mod hooks;
pub mod legacy;
pub mod pyproject;

pub use backend::ModernBackend;
pub use hooks::{HookCaller, HookOutcome};
pub use legacy::{EggInfo, LegacyBuilder, SetuptoolsArgs};
pub use pyproject::{load_pyproject, BuildSystem};
