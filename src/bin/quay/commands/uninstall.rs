//! `quay uninstall` command

use anyhow::Result;

use crate::cli::UninstallArgs;
use quay::install::{find_installed, uninstall_distribution, uninstall_egg_link};
use quay::util::GlobalContext;

pub fn execute(args: UninstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let scheme = ctx.scheme(&args.prefix);

    // Editable installs leave only an egg-link behind
    let removed = if find_installed(&scheme, &args.name, &args.version)?.is_some() {
        uninstall_distribution(&scheme, &args.name, &args.version)?
    } else {
        uninstall_egg_link(&scheme, &args.name, &args.version)?
    };

    tracing::debug!("removed {} paths", removed.len());
    eprintln!("     Removed {} v{}", args.name, args.version);
    Ok(())
}
