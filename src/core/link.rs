//! Links - WHERE a project's bytes live.
//!
//! A `Link` wraps a URL and answers the questions classification needs:
//! is it local, is it version-controlled, what kind of file does it name.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use percent_encoding::percent_decode_str;
use url::Url;

/// File extension of a prebuilt wheel.
pub const WHEEL_EXTENSION: &str = ".whl";

/// Recognized source-archive extensions, multi-part ones first.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tar.lz", ".tar.lzma", ".tgz", ".tbz", ".txz", ".tlz",
    ".tar", ".zip",
];

/// Version-control schemes understood as `<vcs>+<transport>`.
pub const VCS_SCHEMES: &[&str] = &["git", "hg", "svn", "bzr"];

/// A location of a project: remote URL, local file, or VCS reference.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Link {
    url: Url,
}

impl Link {
    /// Parse a link from a URL string.
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s).with_context(|| format!("invalid URL: {}", s))?;
        Ok(Link { url })
    }

    /// Create a `file://` link for a local path.
    ///
    /// Relative paths are resolved against the current directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("failed to determine current directory")?
                .join(path)
        };
        let absolute = crate::util::fs::normalize_path(&absolute);
        let url = Url::from_file_path(&absolute)
            .map_err(|_| anyhow!("invalid path: {}", path.display()))?;
        Ok(Link { url })
    }

    /// The URL scheme, e.g. `https`, `file`, `git+https`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Whether this link points at the local filesystem.
    pub fn is_file(&self) -> bool {
        let scheme = self.scheme();
        scheme == "file" || scheme.ends_with("+file")
    }

    /// Whether this link is a version-control reference.
    pub fn is_vcs(&self) -> bool {
        self.scheme().contains('+')
    }

    /// The VCS backend name (`git`, `hg`, ...), if this is a VCS link.
    pub fn vcs_backend(&self) -> Option<&str> {
        let (vcs, _) = self.scheme().split_once('+')?;
        Some(vcs)
    }

    /// The link with the VCS prefix stripped from the scheme.
    ///
    /// `git+https://host/repo` becomes `https://host/repo`.
    pub fn transport_url(&self) -> String {
        let s = self.url_without_fragment();
        match self.scheme().split_once('+') {
            Some((vcs, _)) => s[vcs.len() + 1..].to_string(),
            None => s,
        }
    }

    /// The VCS transport URL and the `@rev` suffix of its path, if any.
    ///
    /// `git+https://host/repo.git@v1.0#egg=x` yields
    /// (`https://host/repo.git`, `Some("v1.0")`).
    pub fn vcs_url_and_rev(&self) -> (String, Option<String>) {
        let transport = self.transport_url();
        let Ok(mut url) = Url::parse(&transport) else {
            return (transport, None);
        };
        let path = url.path().to_string();
        match path.rsplit_once('@') {
            Some((base, rev)) if !base.is_empty() && !rev.is_empty() && !rev.contains('/') => {
                url.set_path(base);
                (url.to_string(), Some(rev.to_string()))
            }
            _ => (transport, None),
        }
    }

    /// The URL without its `#...` fragment.
    pub fn url_without_fragment(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }

    /// The local filesystem path this link names.
    ///
    /// For VCS links this is the path portion of the `+file` URL.
    pub fn file_path(&self) -> Option<PathBuf> {
        if !self.is_file() {
            return None;
        }
        if self.scheme() == "file" {
            return self.url.to_file_path().ok();
        }
        let plain = Url::parse(&self.transport_url()).ok()?;
        let mut path = plain.to_file_path().ok()?;
        // VCS links may carry `@rev` on the path
        if let Some(s) = path.to_str() {
            if let Some((p, _)) = s.rsplit_once('@') {
                if !p.is_empty() {
                    path = PathBuf::from(p);
                }
            }
        }
        Some(path)
    }

    /// The last path segment, percent-decoded.
    pub fn filename(&self) -> String {
        let segment = self
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        percent_decode_str(segment).decode_utf8_lossy().into_owned()
    }

    /// The file extension, including multi-part archive extensions.
    pub fn ext(&self) -> String {
        split_ext(&self.filename()).1.to_string()
    }

    /// Whether the link names a wheel.
    pub fn is_wheel(&self) -> bool {
        self.ext() == WHEEL_EXTENSION
    }

    /// Whether the link names a recognized source archive.
    pub fn is_archive(&self) -> bool {
        let ext = self.ext();
        ARCHIVE_EXTENSIONS.contains(&ext.as_str())
    }

    /// The value of a `#key=value` fragment parameter.
    pub fn fragment_param(&self, key: &str) -> Option<String> {
        let fragment = self.url.fragment()?;
        fragment.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| v.to_string())
        })
    }

    /// The `#egg=` project name.
    pub fn egg_fragment(&self) -> Option<String> {
        self.fragment_param("egg").filter(|s| !s.is_empty())
    }

    /// The `#subdirectory=` fragment.
    pub fn subdirectory_fragment(&self) -> Option<String> {
        self.fragment_param("subdirectory").filter(|s| !s.is_empty())
    }
}

/// Split a filename into stem and extension, recognizing `.tar.*`.
pub fn split_ext(filename: &str) -> (&str, &str) {
    let lower = filename.to_ascii_lowercase();
    for ext in ARCHIVE_EXTENSIONS.iter().chain(std::iter::once(&WHEEL_EXTENSION)) {
        if lower.ends_with(ext) && lower.len() > ext.len() {
            let at = filename.len() - ext.len();
            return (&filename[..at], &filename[at..]);
        }
    }
    match filename.rfind('.') {
        Some(at) if at > 0 => (&filename[..at], &filename[at..]),
        _ => (filename, ""),
    }
}

/// Check whether a string looks like a URL rather than a path or requirement.
pub fn looks_like_url(s: &str) -> bool {
    match s.split_once(':') {
        Some((scheme, rest)) => {
            let scheme_ok = scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
            scheme_ok && rest.starts_with("//")
        }
        None => false,
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.url)
    }
}
