//! Wheel filenames and compatibility tags.
//!
//! Wheel filenames follow `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`,
//! where each tag component may be a `.`-separated set.

use std::fmt;

use anyhow::{bail, Result};

use crate::core::link::WHEEL_EXTENSION;
use crate::core::requirement::canonicalize_name;

/// A single `(python, abi, platform)` compatibility tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub python: String,
    pub abi: String,
    pub platform: String,
}

impl Tag {
    /// Create a tag from its components.
    pub fn new(python: impl Into<String>, abi: impl Into<String>, platform: impl Into<String>) -> Self {
        Tag {
            python: python.into(),
            abi: abi.into(),
            platform: platform.into(),
        }
    }

    /// Parse a `py3-none-any` style tag, expanding compressed sets.
    pub fn parse_expanded(s: &str) -> Result<Vec<Tag>> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 3 {
            bail!("invalid wheel tag: {}", s);
        }
        Ok(expand(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.python, self.abi, self.platform)
    }
}

fn expand(python: &str, abi: &str, platform: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    for py in python.split('.') {
        for a in abi.split('.') {
            for plat in platform.split('.') {
                tags.push(Tag::new(py, a, plat));
            }
        }
    }
    tags
}

/// The set of tags a target environment accepts, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetTags {
    tags: Vec<Tag>,
}

impl TargetTags {
    /// Create from an explicit ordered tag list.
    pub fn new(tags: Vec<Tag>) -> Self {
        TargetTags { tags }
    }

    /// Parse a list of `py3-none-any` strings.
    pub fn parse<S: AsRef<str>>(tags: &[S]) -> Result<Self> {
        let mut out = Vec::new();
        for tag in tags {
            out.extend(Tag::parse_expanded(tag.as_ref())?);
        }
        Ok(TargetTags { tags: out })
    }

    /// Tags accepted by any CPython 3 interpreter on any platform.
    pub fn pure_python(minor: u32) -> Self {
        let mut tags = Vec::new();
        for m in (0..=minor).rev() {
            tags.push(Tag::new(format!("py3{}", m), "none", "any"));
        }
        tags.push(Tag::new("py3", "none", "any"));
        tags.push(Tag::new(format!("cp3{}", minor), "none", "any"));
        TargetTags { tags }
    }

    /// Check whether any of the given tags is supported.
    pub fn supports_any<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        tags.into_iter().any(|t| self.tags.contains(t))
    }

    /// The supported tags, most preferred first.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// A parsed wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    /// Project name as written in the filename (`_` for separators)
    pub name: String,
    /// Project version
    pub version: String,
    /// Optional build tag
    pub build: Option<String>,
    /// Expanded compatibility tags
    pub tags: Vec<Tag>,
}

impl WheelFilename {
    /// Parse a wheel filename.
    pub fn parse(filename: &str) -> Result<Self> {
        let Some(stem) = filename.strip_suffix(WHEEL_EXTENSION) else {
            bail!("not a wheel filename: {}", filename);
        };
        let parts: Vec<&str> = stem.split('-').collect();
        let (name, version, build, py, abi, plat) = match parts.as_slice() {
            [name, version, py, abi, plat] => (name, version, None, py, abi, plat),
            [name, version, build, py, abi, plat] => {
                (name, version, Some(build.to_string()), py, abi, plat)
            }
            _ => bail!("invalid wheel filename: {}", filename),
        };
        if name.is_empty() || version.is_empty() {
            bail!("invalid wheel filename: {}", filename);
        }
        Ok(WheelFilename {
            name: name.to_string(),
            version: version.to_string(),
            build,
            tags: expand(py, abi, plat),
        })
    }

    /// The project name with filename escaping undone.
    pub fn display_name(&self) -> String {
        self.name.replace('_', "-")
    }

    /// The canonical project name.
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }

    /// Whether any of this wheel's tags is supported by the target.
    pub fn is_supported_by(&self, target: &TargetTags) -> bool {
        target.supports_any(&self.tags)
    }
}

/// The parsed `WHEEL` file of a wheel's dist-info directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelInfo {
    /// `Wheel-Version`
    pub wheel_version: Option<String>,
    /// Whether root files install to purelib rather than platlib
    pub root_is_purelib: bool,
    /// Expanded `Tag:` lines
    pub tags: Vec<Tag>,
}

impl WheelInfo {
    /// Parse the `key: value` lines of a `WHEEL` file.
    pub fn parse(text: &str) -> Result<Self> {
        let mut info = WheelInfo {
            wheel_version: None,
            root_is_purelib: true,
            tags: Vec::new(),
        };
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "wheel-version" => info.wheel_version = Some(value.to_string()),
                "root-is-purelib" => info.root_is_purelib = value.eq_ignore_ascii_case("true"),
                "tag" => info.tags.extend(Tag::parse_expanded(value)?),
                _ => {}
            }
        }
        Ok(info)
    }

    /// Whether any declared tag is supported by the target.
    pub fn is_supported_by(&self, target: &TargetTags) -> bool {
        target.supports_any(&self.tags)
    }
}
