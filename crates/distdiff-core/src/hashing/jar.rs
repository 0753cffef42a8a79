//! Jar digests that ignore build-time noise.
//!
//! Skipped entries: directories, signer files (`META-INF/*.SF`, `*.DSA`),
//! `META-INF/INDEX.LIST`, Maven POM metadata and generated logger/bundle
//! classes. The manifest contributes only its main attributes, minus a
//! fixed set that changes from build to build.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use zip::ZipArchive;

use crate::errors::{DistDiffError, Result};

const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

const IGNORED_MANIFEST_ATTRIBUTES: [&str; 15] = [
    "Archiver-Version",
    "Built-By",
    "Build-Jdk",
    "Build-Timestamp",
    "Created-By",
    "Implementation-Version",
    "Java-Vendor",
    "Java-Version",
    "JBossAS-Release-Version",
    "Os-Arch",
    "Os-Name",
    "Os-Version",
    "Scm-Revision",
    "Specification-Version",
    "Bnd-LastModified",
];

/// Hex SHA-256 over the filtered, name-sorted entries of a jar.
///
/// # Errors
///
/// `Io` when the file cannot be opened, `Archive` when it is not a readable
/// zip.
pub fn digest_jar(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    feed_jar(&mut hasher, path)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Feed the filtered entries of a jar into an existing digest.
pub(crate) fn feed_jar(hasher: &mut Sha256, path: &Path) -> Result<()> {
    for (name, digest) in entry_digests(path)? {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(digest.as_bytes());
        hasher.update([0u8]);
    }
    Ok(())
}

fn entry_digests(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).map_err(|e| DistDiffError::io(path, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| DistDiffError::archive(path, e))?;

    let mut digests = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| DistDiffError::archive(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if is_ignored_entry(&name) {
            continue;
        }

        let mut hasher = Sha256::new();
        if name.eq_ignore_ascii_case(MANIFEST_ENTRY) {
            let mut raw = Vec::new();
            entry
                .read_to_end(&mut raw)
                .map_err(|e| DistDiffError::archive(path, e))?;
            hasher.update(canonical_manifest(&raw).as_bytes());
            digests.insert(MANIFEST_ENTRY.to_string(), hex::encode(hasher.finalize()));
            continue;
        }
        io::copy(&mut entry, &mut hasher).map_err(|e| DistDiffError::archive(path, e))?;
        digests.insert(name, hex::encode(hasher.finalize()));
    }
    Ok(digests)
}

fn is_ignored_entry(name: &str) -> bool {
    if name.ends_with('/') {
        return true;
    }
    if let Some(meta) = name.strip_prefix("META-INF/") {
        if meta == "INDEX.LIST" {
            return true;
        }
        if !meta.contains('/') && (meta.ends_with(".SF") || meta.ends_with(".DSA")) {
            return true;
        }
        if meta.starts_with("maven/")
            && (meta.ends_with("/pom.properties")
                || meta.ends_with("/pom.xml")
                || meta.ends_with("/effective-pom.xml"))
        {
            return true;
        }
    }
    name.ends_with("_$bundle.class")
        || name.ends_with("_$logger.class")
        || name.contains("_$bundle_")
        || name.contains("_$logger_")
}

/// Main-section attributes, unfolded, filtered and sorted, one per line.
fn canonical_manifest(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut attributes: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = attributes.last_mut() {
                value.push_str(continuation);
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            attributes.push((key.trim().to_string(), value.trim_start().to_string()));
        }
    }

    attributes.retain(|(key, _)| {
        !IGNORED_MANIFEST_ATTRIBUTES
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(key))
    });
    attributes.sort();
    attributes
        .into_iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_entries() {
        assert!(is_ignored_entry("META-INF/"));
        assert!(is_ignored_entry("META-INF/JBOSS.SF"));
        assert!(is_ignored_entry("META-INF/JBOSS.DSA"));
        assert!(is_ignored_entry("META-INF/INDEX.LIST"));
        assert!(is_ignored_entry(
            "META-INF/maven/org.jboss/jboss-foo/pom.properties"
        ));
        assert!(is_ignored_entry("META-INF/maven/org.jboss/jboss-foo/pom.xml"));
        assert!(is_ignored_entry("org/foo/FooLogger_$logger.class"));
        assert!(is_ignored_entry("org/foo/FooMessages_$bundle.class"));
        assert!(is_ignored_entry("org/foo/FooLogger_$logger_de.class"));

        assert!(!is_ignored_entry("META-INF/MANIFEST.MF"));
        assert!(!is_ignored_entry("META-INF/services/org.foo.Spi"));
        assert!(!is_ignored_entry("org/foo/Foo.class"));
    }

    #[test]
    fn test_manifest_drops_volatile_attributes() {
        let first = b"Manifest-Version: 1.0\r\nBuilt-By: alice\r\nBuild-Jdk: 1.8.0_60\r\n\
Bundle-Name: foo\r\n\r\nName: org/foo/\r\nSealed: true\r\n";
        let second = b"Bundle-Name: foo\nbuilt-by: bob\nManifest-Version: 1.0\n";
        assert_eq!(canonical_manifest(first), canonical_manifest(second));
        assert_eq!(
            canonical_manifest(first),
            "Bundle-Name: foo\nManifest-Version: 1.0\n"
        );
    }

    #[test]
    fn test_manifest_continuation_lines_are_unfolded() {
        let raw = b"Export-Package: org.foo,org.\n bar\nManifest-Version: 1.0\n";
        assert_eq!(
            canonical_manifest(raw),
            "Export-Package: org.foo,org.bar\nManifest-Version: 1.0\n"
        );
    }

    #[test]
    fn test_unreadable_jar_is_archive_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = digest_jar(&path).unwrap_err();
        assert!(matches!(err, DistDiffError::Archive { .. }));
    }
}
