//! Simple mode: order-independent sum of per-file digests.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::errors::{DistDiffError, Result};

/// Wrapping sum of the leading 64 bits of every file's SHA-256, recursively.
pub(crate) fn digest_directory(dir: &Path) -> Result<String> {
    let mut sum: u64 = 0;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        sum = sum.wrapping_add(file_fingerprint(entry.path())?);
    }
    Ok(format!("{:016x}", sum))
}

fn file_fingerprint(path: &Path) -> Result<u64> {
    let mut file = File::open(path).map_err(|e| DistDiffError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| DistDiffError::io(path, e))?;
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(u64::from_be_bytes(head))
}
