//! Core metadata (`PKG-INFO` / `METADATA`) parsing.
//!
//! The format is a sequence of `Key: value` headers, with continuation lines
//! indented by whitespace, terminated by a blank line and an optional body.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Distribution metadata extracted from a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// `Metadata-Version`
    pub metadata_version: Option<String>,
    /// `Name`
    pub name: String,
    /// `Version`
    pub version: String,
    /// `Summary`
    pub summary: Option<String>,
    /// `Requires-Python`
    pub requires_python: Option<String>,
    /// `Requires-Dist`, in declaration order
    pub requires_dist: Vec<String>,
    /// `Provides-Extra`
    pub provides_extra: Vec<String>,
}

impl Metadata {
    /// Parse metadata from its textual form.
    pub fn parse(text: &str) -> Result<Self> {
        let mut headers: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            if line.is_empty() {
                break;
            }
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = headers.last_mut() {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let mut metadata = Metadata::default();
        for (key, value) in headers {
            match key.to_ascii_lowercase().as_str() {
                "metadata-version" => metadata.metadata_version = Some(value),
                "name" => metadata.name = value,
                "version" => metadata.version = value,
                "summary" => metadata.summary = Some(value),
                "requires-python" => metadata.requires_python = Some(value),
                "requires-dist" => metadata.requires_dist.push(value),
                "provides-extra" => metadata.provides_extra.push(value),
                _ => {}
            }
        }

        if metadata.name.is_empty() {
            bail!("metadata has no `Name` field");
        }
        if metadata.version.is_empty() {
            bail!("metadata has no `Version` field");
        }
        Ok(metadata)
    }

    /// Load metadata from a `PKG-INFO` or `METADATA` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read metadata: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid metadata in {}", path.display()))
    }

    /// Load metadata from an `.egg-info` directory.
    ///
    /// `requires.txt` supplies dependencies when `PKG-INFO` lists none.
    pub fn load_egg_info(dir: &Path) -> Result<Self> {
        let mut metadata = Self::load(&dir.join("PKG-INFO"))?;
        let requires = dir.join("requires.txt");
        if metadata.requires_dist.is_empty() && requires.exists() {
            let text = fs::read_to_string(&requires)
                .with_context(|| format!("failed to read {}", requires.display()))?;
            metadata.requires_dist = parse_requires_txt(&text);
        }
        Ok(metadata)
    }
}

/// Convert an egg-info `requires.txt` into `Requires-Dist` style entries.
///
/// Sections look like `[extra]`, `[:marker]` or `[extra:marker]`.
pub fn parse_requires_txt(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut section_marker: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let (extra, marker) = match section.split_once(':') {
                Some((extra, marker)) => (extra.trim(), marker.trim()),
                None => (section.trim(), ""),
            };
            let mut clauses = Vec::new();
            if !marker.is_empty() {
                clauses.push(format!("({})", marker));
            }
            if !extra.is_empty() {
                clauses.push(format!("extra == \"{}\"", extra));
            }
            section_marker = (!clauses.is_empty()).then(|| clauses.join(" and "));
            continue;
        }
        match section_marker {
            Some(ref marker) => out.push(format!("{}; {}", line, marker)),
            None => out.push(line.to_string()),
        }
    }

    out
}
