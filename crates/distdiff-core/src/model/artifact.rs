//! The artifact record shared by every stage of a comparison.
//!
//! ## Identity
//!
//! Two artifacts are the same artifact iff their `name` and `relative_path`
//! match. Kind, paths, status and level never take part in equality or
//! hashing, so one record can be merged and re-classified in place.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::build_info::JarBuildInfo;
use super::status::Status;

/// Which distribution a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Artifact kind, classified by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    File,
    Folder,
    Archive,
    CompiledClass,
    Jar,
}

impl ArtifactKind {
    /// Classify a directory entry by its file name.
    pub fn classify(file_name: &str, is_dir: bool) -> Self {
        if is_dir {
            return ArtifactKind::Folder;
        }
        let extension = match file_name.rfind('.') {
            Some(idx) => file_name[idx + 1..].to_ascii_lowercase(),
            None => return ArtifactKind::File,
        };
        match extension.as_str() {
            "jar" => ArtifactKind::Jar,
            "class" => ArtifactKind::CompiledClass,
            "zip" | "war" | "ear" | "sar" => ArtifactKind::Archive,
            _ => ArtifactKind::File,
        }
    }
}

/// Identity key of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId {
    pub name: String,
    pub relative_path: String,
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.relative_path)
    }
}

/// One file, folder or archive of a distribution.
///
/// `relative_path` always uses `/` separators regardless of platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub relative_path: String,
    pub kind: ArtifactKind,
    pub path_a: Option<PathBuf>,
    pub path_b: Option<PathBuf>,
    pub status: Status,
    /// Tree depth; entries directly under the root have level 1
    pub level: usize,
    /// Relative path of the containing folder; empty at the root
    pub parent_relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_info: Option<JarBuildInfo>,
}

impl Artifact {
    /// Create an artifact seen on one side of the comparison.
    ///
    /// The status is `Same` until the baseline differ classifies it.
    pub fn new(
        relative_path: impl Into<String>,
        kind: ArtifactKind,
        side: Side,
        path: PathBuf,
    ) -> Self {
        let relative_path = relative_path.into();
        let (parent, name) = match relative_path.rfind('/') {
            Some(idx) => (
                relative_path[..idx].to_string(),
                relative_path[idx + 1..].to_string(),
            ),
            None => (String::new(), relative_path.clone()),
        };
        let level = relative_path.split('/').count();
        let build_info = match kind {
            ArtifactKind::Jar => JarBuildInfo::parse(&name),
            _ => None,
        };
        let (path_a, path_b) = match side {
            Side::A => (Some(path), None),
            Side::B => (None, Some(path)),
        };
        Self {
            name,
            relative_path,
            kind,
            path_a,
            path_b,
            status: Status::Same,
            level,
            parent_relative_path: parent,
            build_info,
        }
    }

    /// Identity key
    pub fn id(&self) -> ArtifactId {
        ArtifactId {
            name: self.name.clone(),
            relative_path: self.relative_path.clone(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ArtifactKind::Folder
    }

    /// Path on the given side, if the artifact exists there
    pub fn path(&self, side: Side) -> Option<&Path> {
        match side {
            Side::A => self.path_a.as_deref(),
            Side::B => self.path_b.as_deref(),
        }
    }

    /// `STATUS: relative/path` listing line
    pub fn listing_line(&self) -> String {
        format!("{}: {}", self.status, self.relative_path)
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.relative_path == other.relative_path
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.relative_path.hash(state);
    }
}
