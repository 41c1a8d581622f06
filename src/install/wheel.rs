//! Installing an unpacked wheel into a scheme.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::{Metadata, Scheme, WheelInfo};
use crate::util::fs::{ensure_dir, find_single_with_suffix, relative_path, write_string};
use crate::util::hash::{record_hash_bytes, record_hash_file};

/// Written to the `INSTALLER` file of every installed distribution.
pub const INSTALLER: &str = "quay";

/// A console or GUI script declared in `entry_points.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub module: String,
    pub attr: String,
    pub gui: bool,
}

/// Parse the script sections of an `entry_points.txt` file.
pub fn parse_entry_points(text: &str) -> Vec<EntryPoint> {
    let mut out = Vec::new();
    let mut section = String::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            continue;
        }
        let gui = match section.as_str() {
            "console_scripts" => false,
            "gui_scripts" => true,
            _ => continue,
        };
        let Some((name, target)) = line.split_once('=') else {
            continue;
        };
        // Drop `[extras]` after the target
        let target = target.split('[').next().unwrap_or("").trim();
        let Some((module, attr)) = target.split_once(':') else {
            continue;
        };
        out.push(EntryPoint {
            name: name.trim().to_string(),
            module: module.trim().to_string(),
            attr: attr.trim().to_string(),
            gui,
        });
    }

    out
}

fn launcher_script(python: &Path, entry: &EntryPoint) -> String {
    let import_name = entry.attr.split('.').next().unwrap_or(&entry.attr);
    format!(
        "#!{python}\n\
         # -*- coding: utf-8 -*-\n\
         import re\n\
         import sys\n\
         from {module} import {import_name}\n\
         if __name__ == \"__main__\":\n    \
         sys.argv[0] = re.sub(r\"(-script\\.pyw|\\.exe)?$\", \"\", sys.argv[0])\n    \
         sys.exit({attr}())\n",
        python = python.display(),
        module = entry.module,
        import_name = import_name,
        attr = entry.attr,
    )
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Copy a file from a wheel's `scripts` data directory, pointing a
/// `#!python` line at the target interpreter.
fn copy_script(source: &Path, dest: &Path, python: &Path) -> Result<()> {
    let contents =
        fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let rewritten = match contents.strip_prefix(b"#!python") {
        Some(rest) => {
            let mut out = format!("#!{}", python.display()).into_bytes();
            out.extend_from_slice(rest);
            out
        }
        None => contents,
    };
    fs::write(dest, rewritten).with_context(|| format!("failed to write {}", dest.display()))?;
    make_executable(dest)
}

/// Install the unpacked wheel at `unpacked` into `scheme`.
///
/// `python` is the interpreter generated launchers point at. Returns the
/// installed `.dist-info` directory.
pub fn install_wheel(unpacked: &Path, scheme: &Scheme, python: &Path) -> Result<PathBuf> {
    let dist_info = find_single_with_suffix(unpacked, ".dist-info")?;
    let dist_info_name = dist_info
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata = Metadata::load(&dist_info.join("METADATA"))?;
    let wheel_text = crate::util::fs::read_to_string(&dist_info.join("WHEEL"))?;
    let wheel = WheelInfo::parse(&wheel_text)?;

    let lib_dir = if wheel.root_is_purelib {
        &scheme.purelib
    } else {
        &scheme.platlib
    };
    let data_dir_name = format!(
        "{}.data",
        dist_info_name.trim_end_matches(".dist-info")
    );
    let record_rel = Path::new(&dist_info_name).join("RECORD");

    tracing::debug!(
        "Installing {} {} into {}",
        metadata.name,
        metadata.version,
        lib_dir.display()
    );

    let mut installed: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(unpacked).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", unpacked.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(unpacked)
            .with_context(|| format!("path escaped {}", unpacked.display()))?;
        if rel == record_rel {
            continue;
        }

        let mut components = rel.components();
        let first = components.next();
        let is_data = matches!(first, Some(Component::Normal(name)) if name == data_dir_name.as_str());

        let (dest, is_script) = if is_data {
            let key = match components.next() {
                Some(Component::Normal(key)) => key.to_string_lossy().into_owned(),
                _ => continue,
            };
            let base = match key.as_str() {
                "headers" => scheme.headers.join(&metadata.name),
                other => scheme.get(other)?.to_path_buf(),
            };
            (base.join(components.as_path()), key == "scripts")
        } else {
            (lib_dir.join(rel), false)
        };

        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        if is_script {
            copy_script(entry.path(), &dest, python)?;
        } else {
            fs::copy(entry.path(), &dest).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), dest.display())
            })?;
        }
        installed.push(dest);
    }

    let dest_dist_info = lib_dir.join(&dist_info_name);

    let entry_points = dist_info.join("entry_points.txt");
    if entry_points.exists() {
        let text = crate::util::fs::read_to_string(&entry_points)?;
        for entry in parse_entry_points(&text) {
            let script = scheme.scripts.join(&entry.name);
            write_string(&script, &launcher_script(python, &entry))?;
            make_executable(&script)?;
            tracing::debug!("Generated script {}", script.display());
            installed.push(script);
        }
    }

    let installer = dest_dist_info.join("INSTALLER");
    write_string(&installer, &format!("{}\n", INSTALLER))?;
    installed.push(installer);

    write_record(lib_dir, &dest_dist_info, &installed)?;

    tracing::info!("Installed {} {}", metadata.name, metadata.version);
    Ok(dest_dist_info)
}

fn write_record(lib_dir: &Path, dist_info: &Path, installed: &[PathBuf]) -> Result<()> {
    let mut lines = Vec::with_capacity(installed.len() + 1);
    for path in installed {
        let hash = record_hash_file(path)?;
        lines.push(format!(
            "{},{},{}",
            record_path(path, lib_dir),
            hash.hash,
            hash.size
        ));
    }
    let record = dist_info.join("RECORD");
    lines.push(format!("{},,", record_path(&record, lib_dir)));
    lines.sort();
    write_string(&record, &(lines.join("\n") + "\n"))
}

fn record_path(path: &Path, lib_dir: &Path) -> String {
    let rel = relative_path(path, lib_dir).to_string_lossy().replace('\\', "/");
    if rel.contains(',') {
        format!("\"{}\"", rel)
    } else {
        rel
    }
}

/// Hash a generated file's contents in `RECORD` form.
pub fn record_line(rel: &str, contents: &[u8]) -> String {
    let hash = record_hash_bytes(contents);
    format!("{},{},{}", rel, hash.hash, hash.size)
}
