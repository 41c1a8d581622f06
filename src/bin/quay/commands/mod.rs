//! Command implementations

pub mod download;
pub mod install;
pub mod show;
pub mod uninstall;
pub mod wheel;

use anyhow::Result;

use crate::cli::RequirementArgs;
use quay::core::{parse_requirement, RequirementOptions};
use quay::project::{Project, ProjectFactory};
use quay::util::GlobalContext;

/// Classify the requirement on the command line into a project.
pub fn open_project(ctx: &GlobalContext, args: &RequirementArgs) -> Result<Project> {
    let mut config = ctx.project_config();
    if args.use_pep517 {
        config.use_pep517 = Some(true);
    } else if args.no_use_pep517 {
        config.use_pep517 = Some(false);
    }
    if args.no_legacy_wheels {
        config.legacy_wheel_builds = false;
    }

    let req = parse_requirement(
        &args.requirement,
        "command line",
        args.editable,
        false,
        RequirementOptions::default(),
    )?;
    let factory = ProjectFactory::new(config, ctx.services()?)?;
    factory.from_requirement(&req)
}
