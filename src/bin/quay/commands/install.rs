//! `quay install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::commands::open_project;
use quay::util::GlobalContext;

pub fn execute(args: InstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let mut scheme = ctx.scheme(&args.prefix);
    if let Some(ref purelib) = args.purelib {
        scheme.purelib = ctx.resolve_path(purelib);
    }
    if let Some(ref platlib) = args.platlib {
        scheme.platlib = ctx.resolve_path(platlib);
    }
    if let Some(ref scripts) = args.scripts {
        scheme.scripts = ctx.resolve_path(scripts);
    }

    let mut project = open_project(&ctx, &args.req)?;
    let name = project.name()?;
    let version = project.version()?;
    project.install(&scheme)?;

    eprintln!(
        "   Installed {} v{} into {}",
        name,
        version,
        scheme.prefix.display()
    );
    Ok(())
}
