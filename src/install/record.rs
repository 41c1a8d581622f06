//! Turning a `setup.py install --record` file into an uninstallable listing.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::{read_to_string, relative_path, write_string};

fn prepend_root(path: &Path, root: Option<&Path>) -> PathBuf {
    match root {
        Some(root) => {
            let rel: PathBuf = path.components().skip(1).collect();
            if path.is_absolute() {
                root.join(rel)
            } else {
                root.join(path)
            }
        }
        None => path.to_path_buf(),
    }
}

/// Write `installed-files.txt` into the egg-info directory named by the
/// install record.
///
/// Returns the egg-info directory, or `None` if the record named none (the
/// project then cannot be uninstalled).
pub fn record_legacy_install(record: &Path, root: Option<&Path>) -> Result<Option<PathBuf>> {
    let text = read_to_string(record)?;
    let lines: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect();

    let egg_info = lines.iter().find_map(|line| {
        let parent = line.parent()?;
        parent
            .to_string_lossy()
            .ends_with(".egg-info")
            .then(|| prepend_root(parent, root))
    });

    let Some(egg_info) = egg_info else {
        tracing::warn!(
            "Could not find .egg-info directory in install record {}",
            record.display()
        );
        return Ok(None);
    };

    let mut listing: Vec<String> = lines
        .iter()
        .map(|line| {
            relative_path(&prepend_root(line, root), &egg_info)
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    listing.sort();
    listing.dedup();

    write_string(
        &egg_info.join("installed-files.txt"),
        &(listing.join("\n") + "\n"),
    )?;
    Ok(Some(egg_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_legacy_install() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib/python3.11/site-packages");
        let egg = lib.join("example-0.1.0-py3.11.egg-info");
        std::fs::create_dir_all(&egg).unwrap();

        let record = tmp.path().join("record.txt");
        std::fs::write(
            &record,
            format!(
                "{}\n{}\n",
                lib.join("example/__init__.py").display(),
                egg.join("PKG-INFO").display()
            ),
        )
        .unwrap();

        let found = record_legacy_install(&record, None).unwrap();
        assert_eq!(found, Some(egg.clone()));
        assert_eq!(
            std::fs::read_to_string(egg.join("installed-files.txt")).unwrap(),
            "../example/__init__.py\nPKG-INFO\n"
        );
    }

    #[test]
    fn test_record_without_egg_info() {
        let tmp = TempDir::new().unwrap();
        let record = tmp.path().join("record.txt");
        std::fs::write(&record, "/env/lib/example.py\n").unwrap();
        assert_eq!(record_legacy_install(&record, None).unwrap(), None);
    }

    #[test]
    fn test_prepend_root() {
        assert_eq!(
            prepend_root(Path::new("/env/lib/x.py"), Some(Path::new("/stage"))),
            PathBuf::from("/stage/env/lib/x.py")
        );
    }
}
