//! Structural digests of module roots.
//!
//! A module root is digested from the shape of its `module.xml` (root
//! namespace, element names, attributes) and the content of the resources
//! it references. `resource-root` paths are followed instead of hashed as
//! text, so renaming a jar with unchanged content keeps the digest.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sha2::{Digest, Sha256};

use super::{improved, jar};
use crate::errors::{DistDiffError, Result};
use crate::patching::paths::MODULE_DESCRIPTOR;

const RESOURCES: &str = "resources";
const RESOURCE_ROOT: &str = "resource-root";

#[derive(Debug, Default, PartialEq)]
struct ModuleStructure {
    canonical: String,
    resources: Vec<String>,
}

/// Digest of a module root directory.
pub(crate) fn digest_module(dir: &Path) -> Result<String> {
    let descriptor = dir.join(MODULE_DESCRIPTOR);
    let content =
        fs::read_to_string(&descriptor).map_err(|e| DistDiffError::io(&descriptor, e))?;
    let structure = parse_descriptor(&content)
        .map_err(|reason| DistDiffError::module_descriptor(&descriptor, reason))?;

    let mut hasher = Sha256::new();
    hasher.update(structure.canonical.as_bytes());

    for resource in &structure.resources {
        let path = dir.join(resource);
        if !path.exists() {
            tracing::warn!(
                module = %dir.display(),
                resource = %resource,
                "resource referenced by module.xml does not exist"
            );
            continue;
        }
        if resource.to_ascii_lowercase().ends_with(".jar") && path.is_file() {
            jar::feed_jar(&mut hasher, &path)?;
        } else if resource != "." {
            let digest = if path.is_dir() {
                improved::digest_directory(&path)?
            } else {
                improved::digest_file(&path)?
            };
            hasher.update(digest.as_bytes());
        }
    }

    let lib = dir.join("lib");
    if lib.is_dir() {
        hasher.update(improved::digest_directory(&lib)?.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

fn parse_descriptor(content: &str) -> std::result::Result<ModuleStructure, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut structure = ModuleStructure::default();
    let mut resources_depth = 0usize;
    let mut seen_root = false;
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(element) => {
                let local = local_name(&element)?;
                visit(&element, &local, resources_depth > 0, &mut seen_root, &mut structure)?;
                if resources_depth > 0 || local == RESOURCES {
                    resources_depth += 1;
                }
            }
            Event::Empty(element) => {
                let local = local_name(&element)?;
                visit(&element, &local, resources_depth > 0, &mut seen_root, &mut structure)?;
            }
            Event::End(_) => {
                resources_depth = resources_depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("no root element".to_string());
    }
    Ok(structure)
}

fn visit(
    element: &BytesStart<'_>,
    local: &str,
    in_resources: bool,
    seen_root: &mut bool,
    structure: &mut ModuleStructure,
) -> std::result::Result<(), String> {
    let (namespace, attributes) = attributes_of(element)?;

    if in_resources && local == RESOURCE_ROOT {
        let path = attributes
            .into_iter()
            .find(|(key, _)| key == "path")
            .map(|(_, value)| value)
            .ok_or_else(|| "resource-root without a path attribute".to_string())?;
        structure.resources.push(path);
        return Ok(());
    }

    if !*seen_root {
        structure.canonical.push_str("ns=");
        structure.canonical.push_str(namespace.as_deref().unwrap_or(""));
        structure.canonical.push('\n');
        *seen_root = true;
    }
    structure.canonical.push('<');
    structure.canonical.push_str(local);
    for (key, value) in attributes {
        structure.canonical.push(' ');
        structure.canonical.push_str(&key);
        structure.canonical.push_str("=\"");
        structure.canonical.push_str(&value);
        structure.canonical.push('"');
    }
    structure.canonical.push_str(">\n");
    Ok(())
}

fn local_name(element: &BytesStart<'_>) -> std::result::Result<String, String> {
    std::str::from_utf8(element.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

/// Default namespace plus the remaining attributes, sorted by key.
type Attributes = (Option<String>, Vec<(String, String)>);

fn attributes_of(element: &BytesStart<'_>) -> std::result::Result<Attributes, String> {
    let mut namespace = None;
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        if key == "xmlns" {
            namespace = Some(value);
        } else if !key.starts_with("xmlns:") {
            attributes.push((key, value));
        }
    }
    attributes.sort();
    Ok((namespace, attributes))
}
