//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Quay - resolves Python package references into installable artifacts
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the name, version and dependencies of a project
    Show(ShowArgs),

    /// Install a project into a prefix
    Install(InstallArgs),

    /// Remove an installed project from a prefix
    Uninstall(UninstallArgs),

    /// Build a wheel for a project
    Wheel(WheelArgs),

    /// Save a project's source distribution (or wheel)
    Download(DownloadArgs),
}

/// Options shared by every command that takes a requirement.
#[derive(Args)]
pub struct RequirementArgs {
    /// A URL, a path, `name @ url`, or a VCS URL with `#egg=name`
    pub requirement: String,

    /// Treat the requirement as editable (local directory or VCS URL)
    #[arg(short, long)]
    pub editable: bool,

    /// Always build through the standardized backend interface
    #[arg(long, conflicts_with = "no_use_pep517")]
    pub use_pep517: bool,

    /// Always build with `setup.py`
    #[arg(long)]
    pub no_use_pep517: bool,

    /// Install legacy projects directly instead of building wheels
    #[arg(long)]
    pub no_legacy_wheels: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub req: RequirementArgs,

    /// Also check the project against these tags (e.g. `cp311-cp311-manylinux_2_17_x86_64`)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub req: RequirementArgs,

    /// Installation prefix
    #[arg(long)]
    pub prefix: PathBuf,

    /// Override the pure-Python library directory
    #[arg(long)]
    pub purelib: Option<PathBuf>,

    /// Override the platform library directory
    #[arg(long)]
    pub platlib: Option<PathBuf>,

    /// Override the scripts directory
    #[arg(long)]
    pub scripts: Option<PathBuf>,
}

#[derive(Args)]
pub struct UninstallArgs {
    /// Project name
    pub name: String,

    /// Installed version
    pub version: String,

    /// Installation prefix
    #[arg(long)]
    pub prefix: PathBuf,
}

#[derive(Args)]
pub struct WheelArgs {
    #[command(flatten)]
    pub req: RequirementArgs,

    /// Directory to save the wheel in
    #[arg(short = 'w', long, default_value = ".")]
    pub wheel_dir: PathBuf,
}

#[derive(Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub req: RequirementArgs,

    /// Directory to save the archive in
    #[arg(short, long, default_value = ".")]
    pub dest: PathBuf,
}
