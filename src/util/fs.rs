//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Directories never copied when snapshotting a source tree.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".tox", ".nox", "__pycache__"];

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    let walker = WalkDir::new(src).min_depth(1).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e.file_name()
                .to_str()
                .is_some_and(|n| SKIPPED_DIRS.contains(&n)))
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("path escaped {}", src.display()))?;
        let dst_path = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst_path)
                .with_context(|| format!("failed to create directory: {}", dst_path.display()))?;
        } else {
            fs::copy(entry.path(), &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Find the only entry in `dir` whose name ends with `suffix`.
pub fn find_single_with_suffix(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            found.push(entry.path());
        }
    }
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => bail!("no `*{}` found in {}", suffix, dir.display()),
        n => bail!("expected one `*{}` in {}, found {}", suffix, dir.display(), n),
    }
}

/// Remove `dir` and its ancestors while they are empty, stopping at `stop`.
pub fn remove_empty_parents(dir: &Path, stop: &Path) {
    let mut current = Some(dir);
    while let Some(path) = current {
        if path == stop || !path.starts_with(stop) {
            break;
        }
        if fs::remove_dir(path).is_err() {
            break;
        }
        current = path.parent();
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `base`; both must be absolute.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = clean_path(path);
    let base = clean_path(base);
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all_skips_vcs_dirs() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("pkg")).unwrap();
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join("setup.py"), "").unwrap();
        fs::write(src.join("pkg/__init__.py"), "x = 1").unwrap();
        fs::write(src.join(".git/HEAD"), "ref").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert!(dst.join("setup.py").exists());
        assert_eq!(fs::read_to_string(dst.join("pkg/__init__.py")).unwrap(), "x = 1");
        assert!(!dst.join(".git").exists());
    }

    #[test]
    fn test_find_single_with_suffix() {
        let tmp = TempDir::new().unwrap();
        assert!(find_single_with_suffix(tmp.path(), ".whl").is_err());

        fs::write(tmp.path().join("a-1.0-py3-none-any.whl"), "").unwrap();
        let found = find_single_with_suffix(tmp.path(), ".whl").unwrap();
        assert!(found.ends_with("a-1.0-py3-none-any.whl"));

        fs::write(tmp.path().join("b-1.0-py3-none-any.whl"), "").unwrap();
        assert!(find_single_with_suffix(tmp.path(), ".whl").is_err());
    }

    #[test]
    fn test_remove_empty_parents() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a/b/c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(tmp.path().join("a/keep.txt"), "").unwrap();

        remove_empty_parents(&deep, tmp.path());

        assert!(!tmp.path().join("a/b").exists());
        assert!(tmp.path().join("a").exists());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(
                Path::new("/env/lib/python3.11/site-packages/pkg/mod.py"),
                Path::new("/env/lib/python3.11/site-packages")
            ),
            PathBuf::from("pkg/mod.py")
        );
        assert_eq!(
            relative_path(
                Path::new("/env/bin/tool"),
                Path::new("/env/lib/python3.11/site-packages")
            ),
            PathBuf::from("../../../bin/tool")
        );
        assert_eq!(
            clean_path(Path::new("/env/lib/python3.11/site-packages/../../../bin/tool")),
            PathBuf::from("/env/bin/tool")
        );
    }
}
