//! CLI integration tests for quay.
//!
//! These tests drive the binary against locally built wheels, so they need
//! neither a network connection nor a Python interpreter.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the quay binary command, isolated from the user's config.
fn quay(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quay").unwrap();
    cmd.env("HOME", home);
    cmd
}

/// A working directory whose config pins the interpreter version.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".quay")).unwrap();
    fs::write(
        tmp.path().join(".quay/config.toml"),
        "[install]\npython-version = \"3.11\"\n",
    )
    .unwrap();
    tmp
}

/// Write a pure-Python wheel into `dir` and return its path.
fn write_wheel(dir: &Path, name: &str, version: &str, requires: &[&str]) -> PathBuf {
    let module = name.replace('-', "_");
    let dist_info = format!("{}-{}.dist-info", module, version);
    let mut metadata = format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version);
    for req in requires {
        metadata.push_str(&format!("Requires-Dist: {}\n", req));
    }
    let files = [
        (format!("{}/__init__.py", module), String::new()),
        (format!("{}/METADATA", dist_info), metadata),
        (
            format!("{}/WHEEL", dist_info),
            "Wheel-Version: 1.0\nRoot-Is-Purelib: true\nTag: py3-none-any\n".to_string(),
        ),
        (
            format!("{}/RECORD", dist_info),
            format!(
                "{}/__init__.py,,\n{}/METADATA,,\n{}/WHEEL,,\n{}/RECORD,,\n",
                module, dist_info, dist_info, dist_info
            ),
        ),
    ];

    let path = dir.join(format!("{}-{}-py3-none-any.whl", module, version));
    let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    for (rel, contents) in files {
        zip.start_file(rel, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

// ============================================================================
// quay show
// ============================================================================

#[test]
fn test_show_wheel() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &["requests>=2"]);

    quay(tmp.path())
        .arg("show")
        .arg(&wheel)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("name: example"))
        .stdout(predicate::str::contains("version: 0.1.0"))
        .stdout(predicate::str::contains("requests>=2"))
        .stdout(predicate::str::contains("states: LocalWheel"));
}

#[test]
fn test_show_reports_tag_compatibility() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &[]);

    quay(tmp.path())
        .arg("show")
        .arg(&wheel)
        .args(["--tags", "cp311-cp311-linux_x86_64,py3-none-any"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("compatible: true"));
}

#[test]
fn test_show_requirement_without_link_fails() {
    let tmp = workspace();

    quay(tmp.path())
        .args(["show", "example>=1.0"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not say where to find the project"));
}

#[test]
fn test_show_missing_path_fails() {
    let tmp = workspace();

    quay(tmp.path())
        .args(["show", "./missing-0.1.0.tar.gz"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

// ============================================================================
// quay install / uninstall
// ============================================================================

#[test]
fn test_install_and_uninstall_wheel() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &[]);
    let site = tmp.path().join("env/lib/python3.11/site-packages");

    quay(tmp.path())
        .arg("install")
        .arg(&wheel)
        .args(["--prefix", "env"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Installed example v0.1.0"));

    assert!(site.join("example/__init__.py").exists());
    assert!(site.join("example-0.1.0.dist-info/RECORD").exists());

    quay(tmp.path())
        .args(["uninstall", "example", "0.1.0", "--prefix", "env"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed example v0.1.0"));

    assert!(!site.join("example/__init__.py").exists());
    assert!(!site.join("example-0.1.0.dist-info").exists());
}

#[test]
fn test_uninstall_not_installed_fails() {
    let tmp = workspace();

    quay(tmp.path())
        .args(["uninstall", "example", "0.1.0", "--prefix", "env"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

// ============================================================================
// quay wheel / download
// ============================================================================

#[test]
fn test_wheel_copies_existing_wheel() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &[]);

    quay(tmp.path())
        .arg("wheel")
        .arg(&wheel)
        .args(["-w", "dist"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp
        .path()
        .join("dist/example-0.1.0-py3-none-any.whl")
        .exists());
}

#[test]
fn test_download_wheel_falls_back_to_wheel() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &[]);

    quay(tmp.path())
        .arg("download")
        .arg(&wheel)
        .args(["-d", "saved"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    assert!(tmp
        .path()
        .join("saved/example-0.1.0-py3-none-any.whl")
        .exists());
}

#[test]
fn test_editable_wheel_is_rejected() {
    let tmp = workspace();
    let wheel = write_wheel(tmp.path(), "example", "0.1.0", &[]);

    quay(tmp.path())
        .args(["show", "-e"])
        .arg(&wheel)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("editable"));
}
