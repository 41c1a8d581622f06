//! Project resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::project::state::StateKind;
use crate::project::traits::TraitSet;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during project classification or preparation.
///
/// Transport failures from collaborators are not represented here; they
/// propagate as the collaborator's own error.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("requirement `{requirement}` has no link")]
    MissingLink { requirement: String },

    #[error("invalid requirement `{input}`: {reason}")]
    InvalidRequirement { input: String, reason: String },

    #[error("no project type matches traits `{traits}`")]
    NoMatchingProjectType { traits: TraitSet },

    #[error("project types {first} and {second} both declare traits `{traits}`")]
    DuplicateProjectTraits {
        first: StateKind,
        second: StateKind,
        traits: TraitSet,
    },

    #[error("`{property}` changed from `{previous}` to `{current}`")]
    ConsistencyViolation {
        property: &'static str,
        previous: String,
        current: String,
        history: String,
    },

    #[error("{backend} build failed: {message}")]
    BuildFailure { backend: String, message: String },

    #[error("malformed source at {}: {reason}", path.display())]
    MalformedSource { path: PathBuf, reason: String },

    #[error("build requirements not satisfied: {}", missing.join(", "))]
    MissingBuildRequirements { missing: Vec<String> },

    #[error("`{operation}` is not supported by {state}")]
    UnsupportedOperation {
        operation: &'static str,
        state: StateKind,
        history: String,
    },

    #[error("{state} has no successor state")]
    NoTransition { state: StateKind },

    #[error("transition from {from} back to already-visited {to}")]
    NonMonotonicTransition { from: StateKind, to: StateKind },

    #[error("`{name}` {version} is not installed")]
    NotInstalled { name: String, version: String },
}

impl ProjectError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProjectError::MissingLink { requirement } => Diagnostic::error(format!(
                "`{}` does not say where to find the project",
                requirement
            ))
            .with_suggestion("Pass a URL, a path, or `name @ url`"),

            ProjectError::InvalidRequirement { input, reason } => {
                Diagnostic::error(format!("invalid requirement `{}`", input))
                    .with_context(reason.clone())
            }

            ProjectError::NoMatchingProjectType { traits } => {
                Diagnostic::error("unsupported combination of requirement modifiers")
                    .with_context(format!("requirement traits: {}", traits))
                    .with_suggestion(
                        "Editable requirements must be local directories or named VCS URLs",
                    )
            }

            ProjectError::DuplicateProjectTraits { first, second, traits } => {
                Diagnostic::error("project type registry is misconfigured").with_context(
                    format!("{} and {} both claim `{}`", first, second, traits),
                )
            }

            ProjectError::ConsistencyViolation {
                property,
                previous,
                current,
                history,
            } => Diagnostic::error(format!("inconsistent project {}", property))
                .with_context(format!("first resolved as `{}`", previous))
                .with_context(format!("later resolved as `{}`", current))
                .with_context(format!("states: {}", history)),

            ProjectError::BuildFailure { backend, message } => {
                Diagnostic::error(format!("{} build failed", backend))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::BUILD_FAILED)
            }

            ProjectError::MalformedSource { path, reason } => {
                Diagnostic::error(reason.clone())
                    .with_location(path.clone())
                    .with_suggestion(suggestions::MALFORMED_SOURCE)
            }

            ProjectError::MissingBuildRequirements { missing } => {
                let mut diag = Diagnostic::error("build requirements are not satisfied");
                for req in missing {
                    diag = diag.with_context(format!("missing: {}", req));
                }
                diag.with_suggestion("Install the build requirements into the build environment")
            }

            ProjectError::UnsupportedOperation {
                operation,
                state,
                history,
            } => Diagnostic::error(format!("cannot {} this project", operation))
                .with_context(format!("resolution stopped at {}", state))
                .with_context(format!("states: {}", history)),

            ProjectError::NoTransition { state } => {
                Diagnostic::error(format!("{} cannot be prepared further", state))
            }

            ProjectError::NonMonotonicTransition { from, to } => {
                Diagnostic::error("project preparation looped")
                    .with_context(format!("{} -> {}", from, to))
            }

            ProjectError::NotInstalled { name, version } => {
                Diagnostic::error(format!("`{}` {} is not installed", name, version))
                    .with_suggestion(suggestions::CHECK_SCHEME)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::traits::Trait;

    #[test]
    fn test_consistency_violation_diagnostic() {
        let err = ProjectError::ConsistencyViolation {
            property: "name",
            previous: "example".to_string(),
            current: "other".to_string(),
            history: "LocalWheel -> UnpackedWheel".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("inconsistent project name"));
        assert!(output.contains("`example`"));
        assert!(output.contains("LocalWheel -> UnpackedWheel"));
    }

    #[test]
    fn test_no_matching_type_diagnostic() {
        let traits: TraitSet = [Trait::Remote, Trait::Editable, Trait::Archive, Trait::Unnamed]
            .into_iter()
            .collect();
        let err = ProjectError::NoMatchingProjectType { traits };

        assert_eq!(
            err.to_string(),
            "no project type matches traits `archive-editable-remote-unnamed`"
        );
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("help: consider:"));
    }
}
