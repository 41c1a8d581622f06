//! Downloading links over HTTP.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::core::Link;
use crate::project::Downloader;
use crate::util::Spinner;

/// Fetches links with a blocking `reqwest` client.
///
/// `file:` links are copied. A `#sha256=` fragment is verified either way.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader; `timeout_secs` bounds each request.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("quay/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to create HTTP client")?;
        Ok(HttpDownloader { client })
    }

    fn fetch(&self, link: &Link) -> Result<Vec<u8>> {
        if let Some(path) = link.file_path() {
            return std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()));
        }

        let url = link.url_without_fragment();
        let spinner = Spinner::open(format!("Downloading {}", link.filename()));
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("failed to download {}", url))?;
        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read response body from {}", url))?;
        spinner.finish();
        Ok(bytes.to_vec())
    }
}

/// Check data against the link's `#sha256=` fragment, if any.
pub fn verify_hash(link: &Link, data: &[u8]) -> Result<()> {
    let Some(expected) = link.fragment_param("sha256") else {
        return Ok(());
    };
    let actual = format!("{:x}", Sha256::digest(data));
    if !actual.eq_ignore_ascii_case(&expected) {
        bail!(
            "hash mismatch for {}:\n  expected: {}\n  actual:   {}",
            link.url_without_fragment(),
            expected,
            actual
        );
    }
    tracing::debug!("Hash verified: {}", &actual[..16]);
    Ok(())
}

impl Downloader for HttpDownloader {
    fn download(&self, link: &Link, dest: &Path) -> Result<()> {
        let data = self.fetch(link)?;
        verify_hash(link, &data)?;
        if let Some(parent) = dest.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        std::fs::write(dest, &data)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        tracing::debug!("Saved {} ({} bytes)", dest.display(), data.len());
        Ok(())
    }
}
