//! Improved mode: canonical digests independent of listing order.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::{jar, module_xml};
use crate::errors::{DistDiffError, Result};
use crate::patching::paths::MODULE_DESCRIPTOR;

/// Digest a directory, treating module roots structurally.
pub(crate) fn digest_directory(dir: &Path) -> Result<String> {
    if dir.join(MODULE_DESCRIPTOR).is_file() {
        return module_xml::digest_module(dir);
    }

    let mut hasher = Sha256::new();
    for entry in sorted_entries(dir)? {
        let digest = match entry.kind {
            EntryKind::Dir => digest_directory(&entry.path)?,
            EntryKind::File => digest_file(&entry.path)?,
            EntryKind::Link => digest_link(&entry.path)?,
        };
        hasher.update(entry.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(digest.as_bytes());
        hasher.update([0u8]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Digest a single file; jars are digested by their filtered entries.
pub(crate) fn digest_file(path: &Path) -> Result<String> {
    let is_jar = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"));
    if is_jar {
        return jar::digest_jar(path);
    }
    let mut file = File::open(path).map_err(|e| DistDiffError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| DistDiffError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

fn digest_link(path: &Path) -> Result<String> {
    let target = fs::read_link(path).map_err(|e| DistDiffError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(b"link:");
    hasher.update(target.to_string_lossy().as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

enum EntryKind {
    Dir,
    File,
    Link,
}

struct Entry {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

fn sorted_entries(dir: &Path) -> Result<Vec<Entry>> {
    let listing = fs::read_dir(dir).map_err(|e| DistDiffError::io(dir, e))?;
    let mut entries = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|e| DistDiffError::io(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| DistDiffError::io(entry.path(), e))?;
        let kind = if file_type.is_symlink() {
            EntryKind::Link
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            kind,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
