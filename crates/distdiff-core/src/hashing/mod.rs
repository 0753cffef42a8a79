//! Directory Hash Cache
//!
//! Memoizes a recursive content digest per absolute directory for the
//! lifetime of one run.
//!
//! ## Modes
//!
//! - **Simple**: wrapping sum of per-file digests; order independent by
//!   construction.
//! - **Improved**: canonical SHA-256 over name-sorted entries. Module roots
//!   are digested from `module.xml` structure plus their referenced
//!   resources; jars skip volatile metadata.
//!
//! The mode is fixed when the cache is created. Digests of different modes
//! are never compared with each other.

mod improved;
mod jar;
mod module_xml;
mod simple;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DistDiffError, Result};

pub use jar::digest_jar;

/// Hashing strategy of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    #[default]
    Simple,
    Improved,
}

impl std::fmt::Display for HashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashMode::Simple => f.write_str("simple"),
            HashMode::Improved => f.write_str("improved"),
        }
    }
}

/// Hex-encoded directory digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirDigest(String);

impl DirDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DirDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run memo of directory digests.
#[derive(Debug)]
pub struct DirectoryHashCache {
    mode: HashMode,
    entries: HashMap<PathBuf, DirDigest>,
    computations: usize,
}

impl DirectoryHashCache {
    pub fn new(mode: HashMode) -> Self {
        Self {
            mode,
            entries: HashMap::new(),
            computations: 0,
        }
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    /// Number of cached directories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of digests actually computed (cache misses)
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Digest of `dir`, computed on first request and cached afterwards.
    ///
    /// # Errors
    ///
    /// `Hashing` when `dir` is not a directory; `Io`, `ModuleDescriptor` or
    /// `Archive` when its content cannot be read. Failures are not cached.
    pub fn hash(&mut self, dir: &Path) -> Result<DirDigest> {
        let key = absolute(dir)?;
        if let Some(digest) = self.entries.get(&key) {
            tracing::trace!(dir = %key.display(), "directory digest cache hit");
            return Ok(digest.clone());
        }

        if !key.is_dir() {
            return Err(DistDiffError::Hashing {
                path: key.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let digest = match self.mode {
            HashMode::Simple => simple::digest_directory(&key)?,
            HashMode::Improved => improved::digest_directory(&key)?,
        };
        self.computations += 1;
        tracing::debug!(
            dir = %key.display(),
            mode = %self.mode,
            digest = %digest,
            "directory digest computed"
        );

        let digest = DirDigest(digest);
        self.entries.insert(key, digest.clone());
        Ok(digest)
    }

    /// Whether two directories have the same digest.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`DirectoryHashCache::hash`].
    pub fn equivalent(&mut self, a: &Path, b: &Path) -> Result<bool> {
        Ok(self.hash(a)? == self.hash(b)?)
    }
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .map_err(|e| DistDiffError::io(dir, e))
}
