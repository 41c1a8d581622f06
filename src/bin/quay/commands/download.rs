//! `quay download` command

use anyhow::Result;

use crate::cli::DownloadArgs;
use crate::commands::open_project;
use quay::project::ProjectError;
use quay::util::GlobalContext;

pub fn execute(args: DownloadArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let dir = ctx.resolve_path(&args.dest);
    let mut project = open_project(&ctx, &args.req)?;

    // Wheels have no sdist to save; fall back to the wheel itself.
    let saved = match project.save_sdist(&dir) {
        Ok(path) => path,
        Err(e) if matches!(
            e.downcast_ref::<ProjectError>(),
            Some(ProjectError::UnsupportedOperation { .. })
        ) =>
        {
            tracing::debug!("no source distribution: {}", e);
            project.save_wheel(&dir)?
        }
        Err(e) => return Err(e),
    };
    eprintln!("       Saved {}", saved.display());
    Ok(())
}
