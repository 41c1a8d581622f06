//! Hashing utilities for install records.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// A file digest in `RECORD` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHash {
    /// `sha256=<urlsafe base64, no padding>`
    pub hash: String,
    /// File size in bytes
    pub size: u64,
}

/// Hash a byte slice in `RECORD` form.
pub fn record_hash_bytes(data: &[u8]) -> RecordHash {
    let digest = Sha256::digest(data);
    RecordHash {
        hash: format!("sha256={}", URL_SAFE_NO_PAD.encode(digest)),
        size: data.len() as u64,
    }
}

/// Hash a file in `RECORD` form.
pub fn record_hash_file(path: &Path) -> Result<RecordHash> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    let mut size = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        size += bytes_read as u64;
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(RecordHash {
        hash: format!("sha256={}", URL_SAFE_NO_PAD.encode(hasher.finalize())),
        size,
    })
}
