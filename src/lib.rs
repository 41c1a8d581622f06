//! Quay - resolves Python package references into installable artifacts
//!
//! This crate classifies a requirement (a name, a URL, a local path or a
//! VCS reference), then lazily downloads, unpacks and builds it until it
//! can answer questions about the project or install it.

pub mod build;
pub mod core;
pub mod install;
pub mod project;
pub mod sources;
pub mod util;

/// Test utilities and fakes for quay unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides fake downloaders, command runners and VCS
/// checkouts, plus on-disk fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{parse_requirement, Link, ParsedRequirement, RequirementOptions, Scheme};
pub use project::{Project, ProjectConfig, ProjectError, ProjectFactory, ProjectServices};
pub use util::context::GlobalContext;
