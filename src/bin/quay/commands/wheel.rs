//! `quay wheel` command

use anyhow::Result;

use crate::cli::WheelArgs;
use crate::commands::open_project;
use quay::util::GlobalContext;

pub fn execute(args: WheelArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let dir = ctx.resolve_path(&args.wheel_dir);
    let mut project = open_project(&ctx, &args.req)?;

    let wheel = project.save_wheel(&dir)?;
    eprintln!("       Saved {}", wheel.display());
    Ok(())
}
