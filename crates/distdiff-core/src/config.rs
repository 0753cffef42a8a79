//! Run configuration.
//!
//! A run is described by the two distribution roots plus a handful of
//! switches. Configuration can be built in code or loaded from TOML:
//!
//! ```toml
//! folder_a = "/opt/dist-6.4.0"
//! folder_b = "/opt/dist-6.4.0-patched"
//! patch_aware = true
//! hash_mode = "improved"
//! ignore_same_items = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DistDiffError, Result};
use crate::hashing::HashMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    /// Clean distribution
    pub folder_a: PathBuf,
    /// Distribution under test, possibly patched
    pub folder_b: PathBuf,
    #[serde(default)]
    pub patch_aware: bool,
    #[serde(default)]
    pub hash_mode: HashMode,
    #[serde(default)]
    pub ignore_same_items: bool,
    #[serde(default)]
    pub ignore_line_breaks: bool,
    /// Explicit phase list; when absent the caller picks a profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<String>>,
}

impl DiffConfig {
    pub fn new(folder_a: impl Into<PathBuf>, folder_b: impl Into<PathBuf>) -> Self {
        Self {
            folder_a: folder_a.into(),
            folder_b: folder_b.into(),
            patch_aware: false,
            hash_mode: HashMode::Simple,
            ignore_same_items: false,
            ignore_line_breaks: false,
            phases: None,
        }
    }

    pub fn with_patch_aware(mut self, patch_aware: bool) -> Self {
        self.patch_aware = patch_aware;
        self
    }

    pub fn with_hash_mode(mut self, hash_mode: HashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    pub fn with_ignore_same_items(mut self, ignore: bool) -> Self {
        self.ignore_same_items = ignore;
        self
    }

    pub fn with_ignore_line_breaks(mut self, ignore: bool) -> Self {
        self.ignore_line_breaks = ignore;
        self
    }

    pub fn with_phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phases = Some(phases.into_iter().map(Into::into).collect());
        self
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown keys or missing roots.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML file; relative roots resolve against the file's directory.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `InvalidConfig` when it does not
    /// parse.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DistDiffError::io(path, e))?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.folder_a = base.join(&config.folder_a);
            config.folder_b = base.join(&config.folder_b);
        }
        Ok(config)
    }

    /// Check that both roots are directories.
    ///
    /// # Errors
    ///
    /// `InvalidRoot` naming the first offending root.
    pub fn validate(&self) -> Result<()> {
        for root in [&self.folder_a, &self.folder_b] {
            if !root.is_dir() {
                let reason = if root.exists() {
                    "not a directory"
                } else {
                    "does not exist"
                };
                return Err(DistDiffError::InvalidRoot {
                    path: root.display().to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        if self.hash_mode == HashMode::Improved && !self.patch_aware {
            tracing::warn!("improved hashing has no effect without patch awareness");
        }
        Ok(())
    }
}
