//! Version information parsed from jar file names.
//!
//! Names follow `name-Major.Minor.Micro.Suffix-build...`, e.g.
//! `jboss-logging-3.1.4.GA-redhat-1.jar`. The name ends before the first
//! `-`-separated segment that starts with a digit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JarBuildInfo {
    pub name: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub micro: Option<String>,
    pub suffix: Option<String>,
    pub build: Option<String>,
}

impl JarBuildInfo {
    /// Parse a file name (with or without extension).
    ///
    /// Returns `None` for an empty name.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = strip_extension(file_name.trim());
        if stem.is_empty() {
            return None;
        }

        let segments: Vec<&str> = stem.split('-').collect();
        let mut info = JarBuildInfo::default();
        let mut idx = 1;
        while idx < segments.len() && !starts_with_digit(segments[idx]) {
            idx += 1;
        }
        info.name = segments[..idx].join("-");

        let mut build = Vec::new();
        if let Some(version) = segments.get(idx) {
            let mut parts = version.split('.');
            info.major = parts.next().map(str::to_string);
            info.minor = parts.next().map(str::to_string);
            info.micro = parts.next().map(str::to_string);
            info.suffix = parts.next().map(str::to_string);
            let rest: Vec<&str> = parts.collect();
            if !rest.is_empty() {
                build.push(rest.join("."));
            }
            build.extend(segments[idx + 1..].iter().map(|s| s.to_string()));
        }
        if !build.is_empty() {
            info.build = Some(build.join("-"));
        }
        Some(info)
    }

    /// Dotted version string without the build part, if any version was found
    pub fn version(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.major, &self.minor, &self.micro, &self.suffix]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.join("."))
    }
}

/// Name prefix used to find renamed versions of the same jar.
pub fn jar_name_prefix(file_name: &str) -> String {
    JarBuildInfo::parse(file_name)
        .map(|info| info.name)
        .unwrap_or_default()
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn starts_with_digit(segment: &str) -> bool {
    segment.chars().next().is_some_and(|c| c.is_ascii_digit())
}
