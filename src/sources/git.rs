//! Git checkouts of VCS links.

use std::path::Path;

use anyhow::{bail, Context, Result};
use git2::{Commit, Repository, ResetType};

use crate::core::Link;
use crate::project::VcsCheckout;

/// Checks out `git+<transport>` links with libgit2.
///
/// Other version control systems are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCheckout;

impl GitCheckout {
    fn clone_repo(url: &str, dest: &Path) -> Result<Repository> {
        tracing::info!("Cloning {}", url);
        if let Some(parent) = dest.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        Repository::clone(url, dest).with_context(|| format!("failed to clone {}", url))
    }

    fn update_repo(url: &str, dest: &Path) -> Result<Repository> {
        tracing::info!("Updating {} in {}", url, dest.display());
        let repo = Repository::open(dest)
            .with_context(|| format!("failed to open git repository: {}", dest.display()))?;
        {
            let mut remote = repo.find_remote("origin")?;
            remote
                .fetch(
                    &[
                        "+refs/heads/*:refs/remotes/origin/*",
                        "+refs/tags/*:refs/tags/*",
                    ],
                    None,
                    None,
                )
                .with_context(|| format!("failed to fetch {}", url))?;
        }
        Ok(repo)
    }
}

/// Find the commit a branch, tag or revision names.
fn resolve_rev<'r>(repo: &'r Repository, rev: &str) -> Result<Commit<'r>> {
    for name in [
        format!("refs/remotes/origin/{}", rev),
        format!("refs/tags/{}", rev),
    ] {
        if let Ok(reference) = repo.find_reference(&name) {
            return reference
                .peel_to_commit()
                .with_context(|| format!("`{}` is not a commit", name));
        }
    }
    repo.revparse_single(rev)
        .and_then(|object| object.peel_to_commit())
        .with_context(|| format!("revision `{}` not found", rev))
}

impl VcsCheckout for GitCheckout {
    fn checkout(&self, link: &Link, dest: &Path) -> Result<()> {
        match link.vcs_backend() {
            Some("git") => {}
            Some(other) => bail!(
                "cannot check out {}: `{}` is not supported, only git",
                link.url_without_fragment(),
                other
            ),
            None => bail!("{} is not a VCS link", link.url_without_fragment()),
        }

        let (url, rev) = link.vcs_url_and_rev();
        let repo = if dest.join(".git").exists() {
            Self::update_repo(&url, dest)?
        } else {
            Self::clone_repo(&url, dest)?
        };

        if let Some(rev) = rev {
            let commit = resolve_rev(&repo, &rev)?;
            tracing::debug!("Checking out {} at {}", url, commit.id());
            repo.reset(commit.as_object(), ResetType::Hard, None)
                .with_context(|| format!("failed to check out `{}`", rev))?;
        }
        Ok(())
    }
}
