//! On-disk fixtures: wheels, sdists and project trees.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Python version the fakes install for (`lib/python3.11/site-packages`).
pub const FAKE_PYTHON_VERSION: &str = "3.11";

/// Importable module name of a project.
pub fn module_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['-', '.'], "_")
}

/// `<name>-<version>.dist-info`, with the name escaped for filenames.
pub fn dist_info_name(name: &str, version: &str) -> String {
    format!("{}-{}.dist-info", name.replace('-', "_"), version)
}

/// Core metadata text.
pub fn metadata_text(name: &str, version: &str, requires: &[&str]) -> String {
    let mut text = format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version);
    for req in requires {
        text.push_str(&format!("Requires-Dist: {}\n", req));
    }
    text
}

/// The files of a pure-Python wheel, as (archive path, contents).
pub fn wheel_files(name: &str, version: &str, requires: &[&str]) -> Vec<(String, String)> {
    let module = module_name(name);
    let dist_info = dist_info_name(name, version);
    vec![
        (
            format!("{}/__init__.py", module),
            format!("__version__ = \"{}\"\n", version),
        ),
        (
            format!("{}/METADATA", dist_info),
            metadata_text(name, version, requires),
        ),
        (
            format!("{}/WHEEL", dist_info),
            "Wheel-Version: 1.0\nGenerator: quay-tests\nRoot-Is-Purelib: true\nTag: py3-none-any\n"
                .to_string(),
        ),
        (
            format!("{}/RECORD", dist_info),
            format!(
                "{}/__init__.py,,\n{}/METADATA,,\n{}/WHEEL,,\n{}/RECORD,,\n",
                module, dist_info, dist_info, dist_info
            ),
        ),
    ]
}

/// Write the contents of an unpacked wheel into `dir`.
pub fn write_unpacked_wheel(dir: &Path, name: &str, version: &str) {
    for (rel, contents) in wheel_files(name, version, &[]) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Write a wheel at `path` whose metadata says `name` `version`.
///
/// The filename is not checked against the metadata.
pub fn write_wheel_as(path: &Path, name: &str, version: &str, requires: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (rel, contents) in wheel_files(name, version, requires) {
        zip.start_file(rel, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Write `<name>-<version>-py3-none-any.whl` into `dir` and return its path.
pub fn write_wheel(dir: &Path, name: &str, version: &str, requires: &[&str]) -> PathBuf {
    let path = dir.join(format!(
        "{}-{}-py3-none-any.whl",
        name.replace('-', "_"),
        version
    ));
    write_wheel_as(&path, name, version, requires);
    path
}

/// A project built with `setup.py`.
pub fn write_legacy_project(dir: &Path, name: &str) {
    let module = module_name(name);
    fs::create_dir_all(dir.join(&module)).unwrap();
    fs::write(
        dir.join("setup.py"),
        format!(
            "from setuptools import setup\n\nsetup(name=\"{}\", version=\"0.1.0\", packages=[\"{}\"])\n",
            name, module
        ),
    )
    .unwrap();
    fs::write(dir.join(module).join("__init__.py"), "").unwrap();
}

/// A project with only a `pyproject.toml` naming `backend`.
pub fn write_modern_project(dir: &Path, backend: &str) {
    fs::create_dir_all(dir.join("example")).unwrap();
    let requirement = backend.split('.').next().unwrap_or(backend);
    fs::write(
        dir.join("pyproject.toml"),
        format!(
            "[build-system]\nrequires = [\"{}\"]\nbuild-backend = \"{}\"\n\n[project]\nname = \"example\"\nversion = \"0.1.0\"\n",
            requirement, backend
        ),
    )
    .unwrap();
    fs::write(dir.join("example/__init__.py"), "").unwrap();
}

/// Pack the tree at `src` into a `.tar.gz` at `archive`, under `prefix/`.
pub fn write_sdist(src: &Path, archive: &Path, prefix: &str) {
    fs::create_dir_all(archive.parent().unwrap()).unwrap();
    let file = fs::File::create(archive).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(prefix, src).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}
