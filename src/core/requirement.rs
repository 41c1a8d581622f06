//! Requirements - WHAT the user asked for.
//!
//! A `ParsedRequirement` is created once per input string and never mutated.
//! It may or may not carry a link; only linked requirements can be turned
//! into projects.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::link::{looks_like_url, split_ext, Link, ARCHIVE_EXTENSIONS, WHEEL_EXTENSION};
use crate::project::ProjectError;

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<rest>.*?)\s*$",
    )
    .unwrap()
});

/// Normalize a project name for comparison.
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`.
pub fn canonicalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// A named requirement: `name[extras] specifier ; marker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Declared project name, as written
    pub name: String,
    /// Requested extras
    pub extras: Vec<String>,
    /// Version specifier, e.g. `>=1.0,<2`
    pub specifier: String,
    /// Environment marker, e.g. `python_version < "3.8"`
    pub marker: Option<String>,
}

impl Requirement {
    /// Create a requirement with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Requirement {
            name: name.into(),
            extras: Vec::new(),
            specifier: String::new(),
            marker: None,
        }
    }

    /// Parse `name[extras] specifier ; marker`.
    ///
    /// Returns `None` when the text does not start with a valid name.
    pub fn parse(s: &str) -> Option<Self> {
        let (body, marker) = match s.split_once(';') {
            Some((body, marker)) => (body, Some(marker.trim().to_string())),
            None => (s, None),
        };
        let caps = REQUIREMENT_RE.captures(body)?;
        let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
        let specifier_ok = rest.is_empty()
            || rest.starts_with(['<', '>', '=', '!', '~', '('])
            || rest.starts_with("@");
        if !specifier_ok {
            return None;
        }
        let extras = caps
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Some(Requirement {
            name: caps["name"].to_string(),
            extras,
            specifier: rest.trim_start_matches('(').trim_end_matches(')').to_string(),
            marker: marker.filter(|m| !m.is_empty()),
        })
    }

    /// The canonical form of the name.
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        write!(f, "{}", self.specifier)?;
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Options passed through unchanged to legacy builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementOptions {
    /// Options for `bdist_wheel`
    pub build_options: Vec<String>,
    /// Options for `install`/`develop`
    pub install_options: Vec<String>,
    /// Options placed before the setup command
    pub global_options: Vec<String>,
}

/// An input requirement, parsed but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequirement {
    /// Where the project lives, if known
    pub link: Option<Link>,
    /// Declared name and constraints, if any
    pub requirement: Option<Requirement>,
    /// Whether the requirement was marked editable by its source
    pub editable: bool,
    /// Whether the requirement is only a constraint
    pub constraint: bool,
    /// Options passed through to `bdist_wheel`
    pub build_options: Vec<String>,
    /// Options passed through to `install`/`develop`
    pub install_options: Vec<String>,
    /// Options placed before the setup command
    pub global_options: Vec<String>,
    /// Where this requirement came from, for diagnostics
    pub source: String,
    /// The original input text
    pub input: String,
}

impl ParsedRequirement {
    /// The declared project name, if any.
    pub fn name(&self) -> Option<&str> {
        self.requirement.as_ref().map(|r| r.name.as_str())
    }
}

impl fmt::Display for ParsedRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.requirement, &self.link) {
            (Some(req), Some(link)) => write!(f, "{} @ {}", req, link),
            (Some(req), None) => write!(f, "{}", req),
            (None, Some(link)) => write!(f, "{}", link),
            (None, None) => write!(f, "{}", self.input),
        }
    }
}

/// Parse an input requirement string.
///
/// `source` names where the input came from (a file, the command line) and
/// is only used in diagnostics.
pub fn parse_requirement(
    input: &str,
    source: &str,
    editable: bool,
    constraint: bool,
    options: RequirementOptions,
) -> Result<ParsedRequirement> {
    let (link, requirement) = if editable {
        parse_editable(input)?
    } else {
        parse_line(input)?
    };

    tracing::debug!(
        "parsed requirement `{}` from {}: link={:?} name={:?}",
        input,
        source,
        link.as_ref().map(|l| l.to_string()),
        requirement.as_ref().map(|r| r.name.as_str())
    );

    Ok(ParsedRequirement {
        link,
        requirement,
        editable,
        constraint,
        build_options: options.build_options,
        install_options: options.install_options,
        global_options: options.global_options,
        source: source.to_string(),
        input: input.to_string(),
    })
}

fn invalid(input: &str, reason: impl Into<String>) -> anyhow::Error {
    ProjectError::InvalidRequirement {
        input: input.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn parse_editable(input: &str) -> Result<(Option<Link>, Option<Requirement>)> {
    let trimmed = input.trim();
    let path = Path::new(trimmed);

    if path.is_dir() {
        let link = Link::from_path(path)?;
        return Ok((Some(link), None));
    }

    if looks_like_url(trimmed) {
        let link = Link::parse(trimmed)?;
        let is_local_dir = link.scheme() == "file" && link.file_path().is_some_and(|p| p.is_dir());
        if !is_local_dir && !link.is_vcs() {
            return Err(invalid(
                input,
                "editable requirements must be a local project directory or a VCS URL",
            ));
        }
        let name = link.egg_fragment().map(Requirement::named);
        return Ok((Some(link), name));
    }

    Err(invalid(
        input,
        "editable requirements must be a local project directory or a VCS URL",
    ))
}

fn parse_line(input: &str) -> Result<(Option<Link>, Option<Requirement>)> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty requirement"));
    }

    // PEP 508 direct reference: `name @ url`
    if let Some((lhs, rhs)) = trimmed.split_once(" @ ") {
        let requirement = Requirement::parse(lhs)
            .ok_or_else(|| invalid(input, "invalid project name before `@`"))?;
        let (url, marker) = match rhs.split_once(';') {
            Some((url, marker)) => (url.trim(), Some(marker.trim().to_string())),
            None => (rhs.trim(), None),
        };
        let link = if looks_like_url(url) {
            Link::parse(url)?
        } else {
            Link::from_path(Path::new(url))?
        };
        let requirement = Requirement {
            marker: marker.or(requirement.marker),
            ..requirement
        };
        return Ok((Some(link), Some(requirement)));
    }

    if looks_like_url(trimmed) {
        let link = Link::parse(trimmed)?;
        let name = link.egg_fragment().map(Requirement::named);
        return Ok((Some(link), name));
    }

    if looks_like_path(trimmed) {
        let link = Link::from_path(Path::new(trimmed))?;
        return Ok((Some(link), None));
    }

    match Requirement::parse(trimmed) {
        Some(requirement) => Ok((None, Some(requirement))),
        None => Err(invalid(input, "not a requirement, URL, or existing path")),
    }
}

fn looks_like_path(s: &str) -> bool {
    if s.contains(std::path::MAIN_SEPARATOR) || s.contains('/') || s.starts_with('.') {
        return true;
    }
    if Path::new(s).exists() {
        return true;
    }
    let (_, ext) = split_ext(s);
    let ext = ext.to_ascii_lowercase();
    ext == WHEEL_EXTENSION || ARCHIVE_EXTENSIONS.contains(&ext.as_str())
}
